// App orchestrator: owns the dataset handle and answers TUI commands.
//
// The dataset is built once before this loop starts; every comparison is a
// synchronous solve against it.

use crossover_baseball::dataset::{Dataset, Selection};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::protocol::{Catalog, PitcherEntry, UiUpdate, UserCommand};

/// Pitcher/date catalog and model summary for the TUI.
pub fn catalog(dataset: &Dataset, source: &str) -> Catalog {
    let pitchers = dataset
        .pitchers()
        .into_iter()
        .map(|name| {
            let dates = dataset.dates_for(&name);
            PitcherEntry { name, dates }
        })
        .collect();
    Catalog {
        pitchers,
        model: *dataset.model(),
        observation_count: dataset.observations().len(),
        source: source.to_string(),
    }
}

/// Run the orchestrator until Quit or until the command channel closes.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    dataset: &'static Dataset,
    source: String,
) -> anyhow::Result<()> {
    info!("Application event loop started");

    let _ = ui_tx
        .send(UiUpdate::Catalog(Box::new(catalog(dataset, &source))))
        .await;

    loop {
        match cmd_rx.recv().await {
            Some(UserCommand::Quit) => {
                info!("Quit command received, shutting down");
                break;
            }
            Some(UserCommand::Compare { a, b }) => {
                let update = handle_compare(dataset, a, b);
                let _ = ui_tx.send(update).await;
            }
            None => {
                info!("Command channel closed, shutting down");
                break;
            }
        }
    }

    info!("Application event loop exiting");
    Ok(())
}

fn handle_compare(dataset: &Dataset, a: Selection, b: Selection) -> UiUpdate {
    match dataset.compare(&a, &b) {
        Ok(report) => UiUpdate::ComparisonReady(Box::new(report)),
        Err(e) => {
            warn!(
                "comparison {} {} vs {} {} failed: {}",
                a.pitcher, a.date, b.pitcher, b.date, e
            );
            UiUpdate::ComparisonFailed {
                a,
                b,
                message: e.to_string(),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crossover_baseball::crossover::Verdict;
    use crossover_baseball::observation::load_records_from_reader;
    use crossover_core::config::Config;

    const CSV: &str = "\
pitcher,date,ERA,WHIP,fastball_avg_against,age,height,weight,injury_risk,travel_distance,temperature,venue,fatigue_index
Kim,2024-04-02,3.21,1.12,0.245,29,185,88,0.2,1200,18.5,Home,0.31
Lee,2024-04-02,4.05,1.34,0.281,33,181,92,,2400,21.0,Away,0.47
Kim,2024-04-08,3.40,1.18,0.251,29,185,88,0.2,1900,16.0,Away,0.44
Park,2024-04-09,2.85,1.05,0.229,26,190,95,0.1,600,19.2,Home,0.22
Lee,2024-04-10,4.20,1.41,0.290,33,181,92,0.5,3100,23.4,Home,0.58
Kim,2024-04-14,3.05,1.09,0.240,29,185,88,0.2,2500,14.8,Home,0.36
Park,2024-04-15,3.10,1.15,0.238,26,190,95,0.1,1400,21.7,Away,0.35";

    fn test_dataset() -> &'static Dataset {
        let records = load_records_from_reader(CSV.as_bytes(), "inline").unwrap();
        let dataset = Dataset::from_records(records, &Config::with_observations("inline")).unwrap();
        Box::leak(Box::new(dataset))
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, d).unwrap()
    }

    #[test]
    fn catalog_lists_pitchers_with_dates() {
        let c = catalog(test_dataset(), "inline");
        let names: Vec<&str> = c.pitchers.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Kim", "Lee", "Park"]);
        assert_eq!(c.pitchers[0].dates, vec![date(2), date(8), date(14)]);
        assert_eq!(c.observation_count, 7);
        assert_eq!(c.source, "inline");
    }

    #[test]
    fn handle_compare_unknown_date_fails() {
        let update = handle_compare(
            test_dataset(),
            Selection::new("Kim", date(2)),
            Selection::new("Lee", date(3)),
        );
        match update {
            UiUpdate::ComparisonFailed { message, b, .. } => {
                assert!(message.contains("Lee"));
                assert_eq!(b.date, date(3));
            }
            other => panic!("expected ComparisonFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn event_loop_sends_catalog_then_handles_quit() {
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (ui_tx, mut ui_rx) = mpsc::channel(16);

        let handle = tokio::spawn(run(cmd_rx, ui_tx, test_dataset(), "inline".into()));

        let first = ui_rx.recv().await.unwrap();
        assert!(matches!(first, UiUpdate::Catalog(_)), "got {first:?}");

        cmd_tx.send(UserCommand::Quit).await.unwrap();
        let result = handle.await.unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn event_loop_answers_compare() {
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (ui_tx, mut ui_rx) = mpsc::channel(16);

        let handle = tokio::spawn(run(cmd_rx, ui_tx, test_dataset(), "inline".into()));
        let _catalog = ui_rx.recv().await.unwrap();

        let sel = Selection::new("Lee", date(10));
        cmd_tx
            .send(UserCommand::Compare {
                a: sel.clone(),
                b: sel,
            })
            .await
            .unwrap();

        match ui_rx.recv().await.unwrap() {
            UiUpdate::ComparisonReady(report) => {
                assert!((report.comparison.crossover - 58.0).abs() < 1e-9);
                assert!(matches!(report.comparison.verdict, Verdict::Crossover { .. }));
            }
            other => panic!("expected ComparisonReady, got {other:?}"),
        }

        cmd_tx.send(UserCommand::Quit).await.unwrap();
        let _ = handle.await;
    }

    #[tokio::test]
    async fn event_loop_exits_when_commands_close() {
        let (cmd_tx, cmd_rx) = mpsc::channel::<UserCommand>(16);
        let (ui_tx, _ui_rx) = mpsc::channel(16);

        let handle = tokio::spawn(run(cmd_rx, ui_tx, test_dataset(), "inline".into()));
        drop(cmd_tx);

        let result = handle.await.unwrap();
        assert!(result.is_ok());
    }
}
