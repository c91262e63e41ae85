use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ScmError;

/// The physical scenarios the harness knows how to set up and plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Case {
    #[serde(rename = "DYCOMS_RF01")]
    DycomsRf01,
    DryBubble,
    #[serde(rename = "GABLS")]
    Gabls,
    Rico,
}

impl Case {
    pub const ALL: [Case; 4] = [Case::DycomsRf01, Case::DryBubble, Case::Gabls, Case::Rico];

    /// Name used by the solver's namelist generator and in output paths.
    pub fn name(self) -> &'static str {
        match self {
            Case::DycomsRf01 => "DYCOMS_RF01",
            Case::DryBubble => "DryBubble",
            Case::Gabls => "GABLS",
            Case::Rico => "Rico",
        }
    }

    /// File name of the reference LES dataset under the LES directory.
    pub fn les_file(self) -> &'static str {
        match self {
            Case::DycomsRf01 => "DYCOMS_RF01.nc",
            Case::DryBubble => "DryBubble.nc",
            Case::Gabls => "Gabls.nc",
            Case::Rico => "Rico.nc",
        }
    }

    /// Built-in download location of the reference dataset.
    /// GABLS reference data is distributed with the repository, not hosted.
    pub fn default_les_url(self) -> Option<&'static str> {
        match self {
            Case::DycomsRf01 => Some("https://www.dropbox.com/s/dh636h4owlt6a79/DYCOMS_RF01.nc?dl=0"),
            Case::DryBubble => Some("https://www.dropbox.com/s/zrhxou8i80bfdk2/DryBubble.nc?dl=0"),
            Case::Gabls => None,
            Case::Rico => Some("https://www.dropbox.com/s/c2bvey47y8xryuc/Rico.nc?dl=0"),
        }
    }
}

impl fmt::Display for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Case {
    type Err = ScmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Case::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ScmError::UnknownCase(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for case in Case::ALL {
            assert_eq!(case.name().parse::<Case>().unwrap(), case);
        }
    }

    #[test]
    fn parsing_ignores_ascii_case() {
        assert_eq!("gabls".parse::<Case>().unwrap(), Case::Gabls);
        assert_eq!("dycoms_rf01".parse::<Case>().unwrap(), Case::DycomsRf01);
    }

    #[test]
    fn unknown_name_is_a_lookup_error() {
        let err = "Bomex".parse::<Case>().unwrap_err();
        assert!(matches!(err, ScmError::UnknownCase(ref n) if n == "Bomex"));
    }

    #[test]
    fn every_hosted_case_points_at_its_own_file() {
        for case in Case::ALL {
            if let Some(url) = case.default_les_url() {
                assert!(url.contains(case.les_file()), "{url} should name {}", case.les_file());
            }
        }
        assert!(Case::Gabls.default_les_url().is_none());
    }
}
