pub use crate::config::*;

/// A builder for assembling a ballot.
///
/// The ballot is validated when it is built, so that a builder never hands out
/// a ballot the poll would refuse.
///
/// ```
/// pub use poll_tally::builder::Builder;
/// # use poll_tally::PollErrors;
///
/// let ballot = Builder::new("Ann")
///     .weekend("Jan 16-18")
///     .weekend("Feb 13-15")
///     .can_drive(Some(true))
///     .build()?;
///
/// assert_eq!(ballot.selected_weekends.len(), 2);
/// assert_eq!(ballot.has_ikon_pass, None);
///
/// assert_eq!(Builder::new("Bob").build(), Err(PollErrors::EmptySelections));
///
/// # Ok::<(), PollErrors>(())
/// ```
pub struct Builder {
    _name: String,
    _weekends: Vec<String>,
    _can_drive: Option<bool>,
    _has_ikon_pass: Option<bool>,
    _willing_to_pitch_jet: Option<bool>,
}

impl Builder {
    pub fn new(name: &str) -> Builder {
        Builder {
            _name: name.to_string(),
            _weekends: Vec::new(),
            _can_drive: None,
            _has_ikon_pass: None,
            _willing_to_pitch_jet: None,
        }
    }

    /// Adds a weekend to the selection. Selecting the same weekend again has no effect.
    pub fn weekend(mut self, weekend: &str) -> Builder {
        if !self._weekends.iter().any(|w| w == weekend) {
            self._weekends.push(weekend.to_string());
        }
        self
    }

    pub fn weekends(self, weekends: &[String]) -> Builder {
        weekends.iter().fold(self, |b, w| b.weekend(w))
    }

    pub fn can_drive(mut self, answer: Option<bool>) -> Builder {
        self._can_drive = answer;
        self
    }

    pub fn has_ikon_pass(mut self, answer: Option<bool>) -> Builder {
        self._has_ikon_pass = answer;
        self
    }

    pub fn willing_to_pitch_jet(mut self, answer: Option<bool>) -> Builder {
        self._willing_to_pitch_jet = answer;
        self
    }

    pub fn build(self) -> Result<Ballot, PollErrors> {
        let ballot = Ballot {
            name: self._name,
            selected_weekends: self._weekends,
            can_drive: self._can_drive,
            has_ikon_pass: self._has_ikon_pass,
            willing_to_pitch_jet: self._willing_to_pitch_jet,
        };
        ballot.validate()?;
        Ok(ballot)
    }
}
