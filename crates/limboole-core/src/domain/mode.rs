//! Solver operation modes.
//!
//! The solver's extended entry point takes an integer *mode selector*:
//!
//! | Selector | Mode                  | Back-end | Question asked           |
//! |----------|-----------------------|----------|--------------------------|
//! | 0        | Validity              | SAT      | is the formula valid?    |
//! | 1        | Satisfiability        | SAT      | is it satisfiable?       |
//! | 2        | QBF validity          | QBF      | reserved, not offered    |
//! | 3        | QBF satisfiability    | QBF      | is the QBF true?         |
//!
//! [`ModeKind`] keeps the selector as its discriminant so the mapping can
//! never drift from the table above.
//!
//! The page lists the modes in a different order ([`ModeKind::MENU_ORDER`]):
//! the runnable ones first, the reserved QBF validity check last.  The
//! position in that list is what the URL fragment stores; the selector is
//! only ever passed to the solver.

use serde::{Deserialize, Serialize};

/// Which question the solver is asked about the input formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum ModeKind {
    Validity = 0,
    Satisfiability = 1,
    QbfValidity = 2,
    QbfSatisfiability = 3,
}

impl ModeKind {
    /// All modes in selector order.
    pub const ALL: [ModeKind; 4] = [
        ModeKind::Validity,
        ModeKind::Satisfiability,
        ModeKind::QbfValidity,
        ModeKind::QbfSatisfiability,
    ];

    /// All modes in the order the page lists them.
    pub const MENU_ORDER: [ModeKind; 4] = [
        ModeKind::Validity,
        ModeKind::Satisfiability,
        ModeKind::QbfSatisfiability,
        ModeKind::QbfValidity,
    ];

    /// The integer passed to the solver's entry point.
    pub fn selector(self) -> i32 {
        self as i32
    }

    /// Maps a solver selector back to a mode, or `None` for unknown values.
    pub fn from_selector(selector: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.selector() == selector)
    }

    /// Label shown in the mode selector.
    pub fn display_name(self) -> &'static str {
        match self {
            ModeKind::Validity => "Validity Check",
            ModeKind::Satisfiability => "Satisfiability Check",
            ModeKind::QbfValidity => "QBF Validity Check",
            ModeKind::QbfSatisfiability => "QBF Satisfiability Check",
        }
    }

    /// `true` for the modes that ask "is there a satisfying assignment?".
    pub fn checks_satisfiability(self) -> bool {
        matches!(self, ModeKind::Satisfiability | ModeKind::QbfSatisfiability)
    }

    /// `true` for the modes routed to the QBF back-end.
    pub fn uses_qbf(self) -> bool {
        matches!(self, ModeKind::QbfValidity | ModeKind::QbfSatisfiability)
    }

    /// QBF validity is reserved: it is listed but cannot be run.
    pub fn is_enabled(self) -> bool {
        self != ModeKind::QbfValidity
    }
}
