//! Save-time behaviors that can be switched on and off.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A save-time behavior.
///
/// Actions carry no data; they only key the enabled/disabled lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    /// Master switch for every save action.
    Activate,
    FieldCanBeFinal,
    LocalCanBeFinal,
    MethodMayBeStatic,
    UnqualifiedFieldAccess,
    MissingOverrideAnnotation,
    UseBlocks,
    UnnecessaryThis,
    UnnecessarySemicolon,
    ExplicitTypeCanBeDiamond,
    SingleStatementInBlock,
}

impl Action {
    /// Returns the configuration key of this action.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Action::Activate => "activate",
            Action::FieldCanBeFinal => "field-can-be-final",
            Action::LocalCanBeFinal => "local-can-be-final",
            Action::MethodMayBeStatic => "method-may-be-static",
            Action::UnqualifiedFieldAccess => "unqualified-field-access",
            Action::MissingOverrideAnnotation => "missing-override-annotation",
            Action::UseBlocks => "use-blocks",
            Action::UnnecessaryThis => "unnecessary-this",
            Action::UnnecessarySemicolon => "unnecessary-semicolon",
            Action::ExplicitTypeCanBeDiamond => "explicit-type-can-be-diamond",
            Action::SingleStatementInBlock => "single-statement-in-block",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
