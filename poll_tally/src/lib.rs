mod config;

pub mod builder;
pub mod manual;

use log::{debug, info};

use std::collections::{HashMap, HashSet};

pub use crate::config::*;

// **** Private structures ****

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
struct OptionId(usize);

#[derive(Eq, PartialEq, Debug, Clone)]
struct OptionTally {
    name: String,
    count: u64,
    voters: Vec<String>,
}

/// Computes the statistics of a poll from the full set of its ballots.
///
/// This function does not validate the ballots: it reports on whatever
/// snapshot it is given. Every option that appears on at least one ballot gets
/// an entry, in the order of first appearance.
///
/// Arguments:
/// * `ballots` the ballots currently stored, in stored order
pub fn tally(ballots: &[Ballot]) -> TallyReport {
    info!("tally: processing {:?} ballots", ballots.len());
    let total = ballots.len() as u64;

    let mut ids: HashMap<String, OptionId> = HashMap::new();
    let mut options: Vec<OptionTally> = Vec::new();

    for b in ballots.iter() {
        // A ballot counts at most once for a given option, even if it lists it twice.
        let mut seen: HashSet<OptionId> = HashSet::new();
        for w in b.selected_weekends.iter() {
            let oid = *ids.entry(w.clone()).or_insert_with(|| {
                options.push(OptionTally {
                    name: w.clone(),
                    count: 0,
                    voters: Vec::new(),
                });
                OptionId(options.len() - 1)
            });
            if !seen.insert(oid) {
                debug!("tally: ballot {:?} lists {:?} more than once", b.name, w);
                continue;
            }
            let opt = &mut options[oid.0];
            opt.count += 1;
            if !opt.voters.contains(&b.name) {
                opt.voters.push(b.name.clone());
            }
        }
    }

    let option_stats: Vec<(String, OptionStats)> = options
        .into_iter()
        .map(|o| {
            let percentage = rounded_percentage(o.count, total);
            (
                o.name,
                OptionStats {
                    count: o.count,
                    voters: o.voters,
                    percentage,
                },
            )
        })
        .collect();
    for (name, stats) in option_stats.iter() {
        debug!(
            "tally: {}: {} ballots ({}%)",
            name, stats.count, stats.percentage
        );
    }

    TallyReport {
        ballots: ballots.to_vec(),
        option_stats,
        drive_stats: tally_attribute(ballots, Attribute::CanDrive),
        ikon_stats: tally_attribute(ballots, Attribute::HasIkonPass),
        jet_stats: tally_attribute(ballots, Attribute::WillingToPitchJet),
    }
}

fn tally_attribute(ballots: &[Ballot], attribute: Attribute) -> AttributeStats {
    let mut stats = AttributeStats::default();
    for b in ballots.iter() {
        match b.attribute(attribute) {
            Some(true) => stats.yes += 1,
            Some(false) => stats.no += 1,
            None => {}
        }
    }
    stats.total = stats.yes + stats.no;
    debug!("tally_attribute: {:?}: {:?}", attribute, stats);
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn ballot(name: &str, weekends: &[&str]) -> Ballot {
        Ballot {
            name: name.to_string(),
            selected_weekends: weekends.iter().map(|s| s.to_string()).collect(),
            can_drive: None,
            has_ikon_pass: None,
            willing_to_pitch_jet: None,
        }
    }

    #[test]
    fn empty_poll() {
        init();
        let res = tally(&[]);
        assert!(res.option_stats.is_empty());
        assert_eq!(res.total_ballots(), 0);
        assert_eq!(res.drive_stats, AttributeStats::default());
        assert_eq!(res.jet_stats.yes_percentage(), None);
    }

    #[test]
    fn two_voters_two_weekends() {
        init();
        let ballots = vec![ballot("Bob", &["W1", "W2"]), ballot("ann", &["W2"])];
        let res = tally(&ballots);
        assert_eq!(
            res.option("W1"),
            Some(&OptionStats {
                count: 1,
                voters: vec!["Bob".to_string()],
                percentage: 50
            })
        );
        assert_eq!(
            res.option("W2"),
            Some(&OptionStats {
                count: 2,
                voters: vec!["Bob".to_string(), "ann".to_string()],
                percentage: 100
            })
        );
        let names: Vec<&str> = res.option_stats.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["W1", "W2"]);
    }

    #[test]
    fn unanimous_option() {
        init();
        let ballots = vec![
            ballot("a", &["W1"]),
            ballot("b", &["W1", "W3"]),
            ballot("c", &["W1"]),
        ];
        let res = tally(&ballots);
        assert_eq!(res.option("W1").unwrap().percentage, 100);
        assert_eq!(res.option("W3").unwrap().percentage, 33);
        assert_eq!(res.option("W2"), None);
    }

    #[test]
    fn duplicate_weekend_on_one_ballot() {
        init();
        let ballots = vec![ballot("a", &["W1", "W1"]), ballot("b", &["W2"])];
        let res = tally(&ballots);
        let w1 = res.option("W1").unwrap();
        assert_eq!(w1.count, 1);
        assert_eq!(w1.voters, vec!["a".to_string()]);
        assert_eq!(w1.percentage, 50);
    }

    #[test]
    fn rounding_half_up() {
        assert_eq!(rounded_percentage(1, 8), 13);
        assert_eq!(rounded_percentage(2, 3), 67);
        assert_eq!(rounded_percentage(1, 3), 33);
        assert_eq!(rounded_percentage(1, 200), 1);
        assert_eq!(rounded_percentage(0, 5), 0);
        assert_eq!(rounded_percentage(0, 0), 0);
    }

    #[test]
    fn voters_are_not_repeated() {
        init();
        // Two entries with the exact same name can only come from a hand-edited file.
        let ballots = vec![ballot("a", &["W1"]), ballot("a", &["W1"])];
        let res = tally(&ballots);
        let w1 = res.option("W1").unwrap();
        assert_eq!(w1.count, 2);
        assert_eq!(w1.voters, vec!["a".to_string()]);
    }

    #[test]
    fn attributes_skip_unknown() {
        init();
        let mut a = ballot("a", &["W1"]);
        a.can_drive = Some(true);
        a.has_ikon_pass = None;
        a.willing_to_pitch_jet = Some(false);
        let mut b = ballot("b", &["W1"]);
        b.can_drive = None;
        b.has_ikon_pass = Some(false);
        b.willing_to_pitch_jet = Some(false);
        let c = ballot("c", &["W2"]);

        let res = tally(&[a, b, c]);
        assert_eq!(
            res.drive_stats,
            AttributeStats {
                yes: 1,
                no: 0,
                total: 1
            }
        );
        assert_eq!(
            res.ikon_stats,
            AttributeStats {
                yes: 0,
                no: 1,
                total: 1
            }
        );
        assert_eq!(
            res.jet_stats,
            AttributeStats {
                yes: 0,
                no: 2,
                total: 2
            }
        );
        assert_eq!(res.drive_stats.yes_percentage(), Some(100));
        assert_eq!(res.jet_stats.yes_percentage(), Some(0));
        assert_eq!(res.option("W1").unwrap().percentage, 67);
    }

    #[test]
    fn ranked_options_are_stable() {
        init();
        let ballots = vec![
            ballot("a", &["W1", "W2"]),
            ballot("b", &["W3", "W2"]),
            ballot("c", &["W3"]),
            ballot("d", &["W1"]),
        ];
        let res = tally(&ballots);
        let ranked: Vec<String> = res.ranked_options().into_iter().map(|(n, _)| n).collect();
        // W1, W2 and W3 all have two votes: first-seen order is kept.
        assert_eq!(ranked, vec!["W1", "W2", "W3"]);

        let ballots = vec![ballot("a", &["W1"]), ballot("b", &["W2"]), ballot("c", &["W2"])];
        let ranked: Vec<String> = tally(&ballots)
            .ranked_options()
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(ranked, vec!["W2", "W1"]);
    }

    #[test]
    fn validation() {
        assert_eq!(
            ballot("", &["W1"]).validate(),
            Err(PollErrors::EmptyIdentity)
        );
        assert_eq!(
            ballot("   ", &["W1"]).validate(),
            Err(PollErrors::EmptyIdentity)
        );
        assert_eq!(ballot("a", &[]).validate(), Err(PollErrors::EmptySelections));
        assert_eq!(ballot("a", &["W1"]).validate(), Ok(()));
        assert!(ballot("Ann", &["W1"]).same_voter(&ballot("aNN", &["W2"])));
    }
}
