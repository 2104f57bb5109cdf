//! Orchestration of one tabulation run: read the ballots, count, write the
//! result stream, and compare against a reference when one is supplied.

pub mod io_csv;

use std::fs;
use std::io::{BufReader, Write};

use anyhow::{anyhow, Context};
use log::{info, warn};

use serde::Serialize;
use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use transferable_vote::{read_request, tabulate, write_result_codes, CaseOutcome, CaseRequest};

use crate::args::Args;

pub fn run(args: Args) -> anyhow::Result<()> {
    let request = read_input(&args)?;
    let outcome = tabulate(request)?;
    info!(
        "case {}: winners {:?}, eliminated {:?}",
        outcome.case_number, outcome.winners, outcome.eliminated
    );

    let mut rendered = Vec::new();
    write_result_codes(&outcome.result_codes, &mut rendered)?;
    let rendered = String::from_utf8(rendered)?;

    match args.out.as_deref() {
        None | Some("stdout") => {
            std::io::stdout().lock().write_all(rendered.as_bytes())?;
        }
        Some(path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("cannot write results to {}", path))?;
        }
    }

    if let Some(path) = &args.summary {
        let summary = serde_json::to_string_pretty(&build_summary_js(&outcome))?;
        fs::write(path, summary).with_context(|| format!("cannot write summary to {}", path))?;
    }

    if let Some(path) = &args.reference {
        check_against_reference(path, &rendered)?;
    }
    Ok(())
}

fn read_input(args: &Args) -> anyhow::Result<CaseRequest> {
    match args.input_type.as_deref().unwrap_or("voteinfo") {
        "voteinfo" => match &args.input {
            Some(path) => {
                let file = fs::File::open(path)
                    .with_context(|| format!("cannot open input file {}", path))?;
                Ok(read_request(BufReader::new(file))?)
            }
            None => Ok(read_request(std::io::stdin().lock())?),
        },
        "csv" => {
            let path = args
                .input
                .as_ref()
                .ok_or_else(|| anyhow!("csv input requires --input"))?;
            let file = fs::File::open(path)
                .with_context(|| format!("cannot open input file {}", path))?;
            io_csv::read_csv_request(file, args)
        }
        other => Err(anyhow!("input type {:?} is not implemented", other)),
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
struct SummaryConfig {
    case: u32,
    seats: u32,
}

fn build_summary_js(outcome: &CaseOutcome) -> JSValue {
    let config = SummaryConfig {
        case: outcome.case_number,
        seats: outcome.seats_to_fill,
    };
    let mut cycles: Vec<JSValue> = Vec::new();
    for stats in &outcome.cycles {
        let mut tally: JSMap<String, JSValue> = JSMap::new();
        for (candidate, count) in &stats.tally {
            tally.insert(candidate.to_string(), json!(count));
        }
        cycles.push(json!({
            "cycle": stats.cycle,
            "totalVotes": stats.total_votes,
            "quota": stats.quota,
            "tally": tally,
            "elected": stats.elected,
            "eliminated": stats.eliminated,
        }));
    }
    json!({
        "config": config,
        "winners": outcome.winners,
        "tiedForNextSeat": outcome.tied_for_next_seat,
        "cycles": cycles,
    })
}

fn check_against_reference(path: &str, rendered: &str) -> anyhow::Result<()> {
    let reference =
        fs::read_to_string(path).with_context(|| format!("cannot read reference file {}", path))?;
    if normalize(&reference) != normalize(rendered) {
        warn!("found differences with the reference stream");
        print_diff(reference.as_str(), rendered, "\n");
        return Err(anyhow!(
            "difference detected between the tabulated results and the reference stream"
        ));
    }
    info!("results match the reference stream");
    Ok(())
}

/// Result streams compare by token, so line layout never matters.
fn normalize(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use transferable_vote::CaseBuilder;

    #[test]
    fn normalization_ignores_layout() {
        assert_eq!(normalize("-69 1\n-2\n"), normalize(" -69  1 -2"));
        assert_ne!(normalize("-69 1 -2"), normalize("-69 2 -2"));
    }

    #[test]
    fn summary_carries_cycles_and_winners() {
        let mut builder = CaseBuilder::new(3, 1).unwrap();
        builder.add_ballots(5, &[&[1], &[2]]).unwrap();
        builder.add_ballots(4, &[&[2], &[1]]).unwrap();
        let outcome = tabulate(builder.build().unwrap()).unwrap();
        let js = build_summary_js(&outcome);
        assert_eq!(js["winners"], json!([1]));
        assert_eq!(js["config"]["seats"], json!(1));
        assert_eq!(js["cycles"][0]["quota"], json!(5));
        assert_eq!(js["cycles"][0]["tally"]["1"], json!(5));
    }
}
