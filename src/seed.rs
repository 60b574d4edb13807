//! Default jokebook content.
//!
//! The in-memory backend loads this set on every start; the SQLite backend
//! loads it only when the joke table is empty.

/// Category name paired with its prompt/punchline entries, in registration
/// order.
pub type SeedSet = [(&'static str, &'static [(&'static str, &'static str)])];

pub const DEFAULT_SEED: &SeedSet = &[
    (
        "funnyJoke",
        &[
            (
                "Dlaczego komputer poszedł do lekarza?",
                "Bo złapał wirusa!",
            ),
            (
                "Dlaczego komputer nie może być głodny?",
                "Bo ma pełen dysk!",
            ),
            (
                "Co mówi jeden bit do drugiego?",
                "„Trzymaj się, zaraz się przestawiamy!\"",
            ),
        ],
    ),
    (
        "lameJoke",
        &[
            (
                "Dlaczego programiści preferują noc?",
                "Bo w nocy jest mniej bugów do łapania!",
            ),
            (
                "Jak nazywa się bardzo szybki programista?",
                "Błyskawiczny kompilator!",
            ),
        ],
    ),
];
