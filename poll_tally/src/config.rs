// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// One participant's full set of answers.
///
/// The field names on the wire are the ones used by the poll form, so that
/// existing vote files can be read back without conversion.
///
/// A missing `name` or `selectedWeekends` deserializes to an empty value:
/// rejecting such a payload is the job of [`Ballot::validate`], not of the parser.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Ballot {
    /// The self-reported name of the voter. Unique across the poll, ignoring case.
    #[serde(default)]
    pub name: String,
    /// The chosen weekends, in the order they were picked.
    #[serde(rename = "selectedWeekends", default)]
    pub selected_weekends: Vec<String>,
    #[serde(rename = "canDrive", default)]
    pub can_drive: Option<bool>,
    #[serde(rename = "hasIkonPass", default)]
    pub has_ikon_pass: Option<bool>,
    #[serde(rename = "willingToPitchJet", default)]
    pub willing_to_pitch_jet: Option<bool>,
}

impl Ballot {
    /// The uniqueness key of this ballot: the name, case-folded.
    pub fn identity_key(&self) -> String {
        self.name.to_lowercase()
    }

    /// True if both ballots belong to the same voter.
    pub fn same_voter(&self, other: &Ballot) -> bool {
        self.identity_key() == other.identity_key()
    }

    /// Checks that the ballot can be accepted in the poll.
    pub fn validate(&self) -> Result<(), PollErrors> {
        if self.name.trim().is_empty() {
            return Err(PollErrors::EmptyIdentity);
        }
        if self.selected_weekends.is_empty() {
            return Err(PollErrors::EmptySelections);
        }
        Ok(())
    }

    pub fn attribute(&self, attribute: Attribute) -> Option<bool> {
        match attribute {
            Attribute::CanDrive => self.can_drive,
            Attribute::HasIkonPass => self.has_ikon_pass,
            Attribute::WillingToPitchJet => self.willing_to_pitch_jet,
        }
    }
}

/// The yes/no questions asked next to the weekend choice.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Attribute {
    CanDrive,
    HasIkonPass,
    WillingToPitchJet,
}

impl Attribute {
    pub const ALL: [Attribute; 3] = [
        Attribute::CanDrive,
        Attribute::HasIkonPass,
        Attribute::WillingToPitchJet,
    ];

    /// The key under which the statistics of this attribute are published.
    pub fn stats_key(&self) -> &'static str {
        match self {
            Attribute::CanDrive => "driveStats",
            Attribute::HasIkonPass => "ikonStats",
            Attribute::WillingToPitchJet => "jetStats",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Attribute::CanDrive => "Can drive",
            Attribute::HasIkonPass => "Has an Ikon pass",
            Attribute::WillingToPitchJet => "Willing to pitch in for the jet",
        }
    }
}

/// Reasons for refusing a ballot.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum PollErrors {
    EmptyIdentity,
    EmptySelections,
}

impl Error for PollErrors {}

impl Display for PollErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PollErrors::EmptyIdentity => write!(f, "a name is required"),
            PollErrors::EmptySelections => write!(f, "at least one weekend selection is required"),
        }
    }
}

// ******** Output data structures *********

/// Statistics for one weekend option.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct OptionStats {
    /// Number of ballots that selected this option.
    pub count: u64,
    /// The voters who selected this option, in the order they appear in the poll.
    pub voters: Vec<String>,
    /// Share of all the ballots, rounded half-up to a whole percent.
    pub percentage: u32,
}

/// Statistics for one yes/no question. Unanswered ballots are left out of `total`.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct AttributeStats {
    pub yes: u64,
    pub no: u64,
    pub total: u64,
}

impl AttributeStats {
    /// The share of "yes" among the answered ballots, or None if nobody answered.
    pub fn yes_percentage(&self) -> Option<u32> {
        if self.total == 0 {
            None
        } else {
            Some(rounded_percentage(self.yes, self.total))
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TallyReport {
    pub ballots: Vec<Ballot>,
    /// The weekend options, in the order they were first seen.
    pub option_stats: Vec<(String, OptionStats)>,
    pub drive_stats: AttributeStats,
    pub ikon_stats: AttributeStats,
    pub jet_stats: AttributeStats,
}

impl TallyReport {
    pub fn total_ballots(&self) -> u64 {
        self.ballots.len() as u64
    }

    pub fn attribute_stats(&self, attribute: Attribute) -> AttributeStats {
        match attribute {
            Attribute::CanDrive => self.drive_stats,
            Attribute::HasIkonPass => self.ikon_stats,
            Attribute::WillingToPitchJet => self.jet_stats,
        }
    }

    pub fn option(&self, name: &str) -> Option<&OptionStats> {
        self.option_stats
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s)
    }

    /// The options by decreasing count. Options with the same count keep their first-seen order.
    pub fn ranked_options(&self) -> Vec<(String, OptionStats)> {
        let mut res = self.option_stats.clone();
        res.sort_by(|a, b| b.1.count.cmp(&a.1.count));
        res
    }
}

/// `round(part / total * 100)` with halves rounded up, and 0 for an empty total.
pub(crate) fn rounded_percentage(part: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    ((200 * part + total) / (2 * total)) as u32
}
