// Primitives for reading ballots from CSV files.

use std::io::Read;

use anyhow::{anyhow, Context};
use csv::ReaderBuilder;
use log::debug;

use transferable_vote::{CaseBuilder, CaseRequest, Candidate, CountingRules, QuotaKind};

use crate::args::Args;

/// Reads ballots from rows of candidate numbers in preference order.
///
/// Every cell holds one candidate number, most preferred first; empty
/// cells are skipped. With `--count-column` the first column carries the
/// number of identical ballots for the row, otherwise each row counts
/// once. CSV rows cannot express shared ranking levels.
pub fn read_csv_request<R: Read>(input: R, args: &Args) -> anyhow::Result<CaseRequest> {
    let candidate_count = args
        .candidates
        .ok_or_else(|| anyhow!("csv input requires --candidates"))?;
    let seats = args
        .seats
        .ok_or_else(|| anyhow!("csv input requires --seats"))?;
    let rules = CountingRules {
        quota: if args.droop {
            QuotaKind::Droop
        } else {
            QuotaKind::Hare
        },
        pairwise_loser_elimination: !args.irv,
        ignore_shared_rankings: args.ignore_shared,
        log_detail: true,
    };
    let mut builder = CaseBuilder::new(candidate_count, seats)?.rules(&rules);

    let reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);
    for (index, record) in reader.into_records().enumerate() {
        let lineno = index + 1;
        let record = record.with_context(|| format!("cannot parse csv row {}", lineno))?;
        debug!("csv row {}: {:?}", lineno, record);

        let mut cells = record.iter();
        let count: u64 = if args.count_column {
            let cell = cells
                .next()
                .ok_or_else(|| anyhow!("csv row {} is empty", lineno))?;
            cell.trim()
                .parse()
                .with_context(|| format!("csv row {}: count {:?} is not a number", lineno, cell))?
        } else {
            1
        };

        let mut choices: Vec<Vec<Candidate>> = Vec::new();
        for cell in cells {
            let cell = cell.trim();
            if cell.is_empty() {
                continue;
            }
            let candidate: Candidate = cell.parse().with_context(|| {
                format!("csv row {}: candidate {:?} is not a number", lineno, cell)
            })?;
            choices.push(vec![candidate]);
        }
        let levels: Vec<&[Candidate]> = choices.iter().map(|c| c.as_slice()).collect();
        builder
            .add_ballots(count, &levels)
            .with_context(|| format!("csv row {} is not a valid ballot", lineno))?;
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use transferable_vote::tabulate;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["stvcount"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn reads_plain_rows() {
        let data = b"1,2,3\n1,3,2\n2,1,3\n" as &[u8];
        let request =
            read_csv_request(data, &args(&["--candidates", "3", "--seats", "1"])).unwrap();
        assert_eq!(request.groups.len(), 3);
        let outcome = tabulate(request).unwrap();
        assert_eq!(outcome.winners, vec![1]);
    }

    #[test]
    fn count_column_scales_rows() {
        let data = b"5,1,2\n4,2,1\n" as &[u8];
        let request = read_csv_request(
            data,
            &args(&["--candidates", "2", "--seats", "1", "--count-column"]),
        )
        .unwrap();
        assert_eq!(request.groups[0].initial_count, 5);
        let outcome = tabulate(request).unwrap();
        assert_eq!(outcome.winners, vec![1]);
    }

    #[test]
    fn rejects_missing_options() {
        let data = b"1,2\n" as &[u8];
        assert!(read_csv_request(data, &args(&["--seats", "1"])).is_err());
        assert!(read_csv_request(data, &args(&["--candidates", "2"])).is_err());
    }

    #[test]
    fn rejects_non_numeric_cells() {
        let data = b"1,alice\n" as &[u8];
        let result = read_csv_request(data, &args(&["--candidates", "2", "--seats", "1"]));
        assert!(result.is_err());
    }
}
