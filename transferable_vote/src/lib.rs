/*!

Counting engine for ranked-ballot elections that fill one or more
equivalent seats.

The engine tabulates the Single Transferable Vote (STV), Instant Runoff
Voting (IRV), and the Ranked Choice Including Pairwise Elimination
variants (RCIPE and RCIPE STV), which additionally eliminate any candidate
who would lose every one-on-one contest against the other remaining
candidates. Ballots that rank several candidates at the same preference
level are counted instead of being discarded, and ballots always transfer
in whole numbers: a ballot has full influence or none, never a fraction.

Candidates are plain integers. The engine never sees candidate names,
party labels, or any other ballot text, so nothing in a count can depend
on who the candidates are.

Input arrives either as a voteinfo code stream (see [`stream`] and the
[`manual`]) or through the [`CaseBuilder`]:

```
use transferable_vote::{tabulate, CaseBuilder};

let mut builder = CaseBuilder::new(3, 1)?;
builder.add_ballots(5, &[&[1], &[2]])?;
builder.add_ballots(4, &[&[2], &[1]])?;

let outcome = tabulate(builder.build()?)?;
assert_eq!(outcome.winners, vec![1]);
# Ok::<(), transferable_vote::TallyError>(())
```

*/

pub mod ballots;
pub mod builder;
pub mod codes;
pub mod config;
mod engine;
mod errors;
pub mod manual;
pub mod stream;
pub mod tally;

pub use crate::builder::CaseBuilder;
pub use crate::config::*;
pub use crate::engine::tabulate;
pub use crate::errors::{TallyError, TallyResult};
pub use crate::stream::{read_request, write_result_codes};
