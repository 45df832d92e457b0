use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::ConfigError;

/// History family selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    Spot,
    Margin,
    Future,
    Deposit,
    Withdrawal,
}

impl ExportKind {
    pub const ALL: [ExportKind; 5] = [
        ExportKind::Spot,
        ExportKind::Margin,
        ExportKind::Future,
        ExportKind::Deposit,
        ExportKind::Withdrawal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportKind::Spot => "spot",
            ExportKind::Margin => "margin",
            ExportKind::Future => "future",
            ExportKind::Deposit => "deposit",
            ExportKind::Withdrawal => "withdrawal",
        }
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ExportKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ConfigError::UnknownExportKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kinds() {
        assert_eq!("spot".parse::<ExportKind>().unwrap(), ExportKind::Spot);
        assert_eq!("Withdrawal".parse::<ExportKind>().unwrap(), ExportKind::Withdrawal);
        for kind in ExportKind::ALL {
            assert_eq!(kind.to_string().parse::<ExportKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_kind_lists_choices() {
        let err = "futures".parse::<ExportKind>().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("futures"));
        assert!(message.contains("spot, margin, future, deposit, withdrawal"));
    }
}
