/*!

This is the long-form manual for `transferable_vote` and `stvcount`.

## The voteinfo stream

A case is supplied as a stream of integers separated by spaces, tabs,
commas, periods or line breaks. Negative integers are codes; positive
integers are candidate numbers or code payloads. The layout across lines
carries no meaning, but by convention each ballot group sits on its own
line:

```text
-7
-3 1000001
-4 1
-6 6
-67 5
-9 -4 1 -11 31 1 2 3 -10
-9 -4 1 -11 30 3 1 2 -10
-9 -4 1 -11 2 2 1 3 -10
-9 -4 1 -11 20 4 5 6 -10
-9 -4 1 -11 20 5 4 6 -10
-9 -4 1 -11 17 6 4 5 -10
-8
```

This is the ballot profile from the Wikipedia article comparing the Hare
and Droop quotas: case number 1000001, question 1, six candidates, five
seats, and six ballot groups. `-11 31` starts a group of 31 identical
ballots; the candidate numbers that follow are its ranking, most preferred
first.

Codes a case uses:

| Code | Meaning |
|------|---------|
| -1   | start of all cases (optional) |
| -2   | end of all cases (terminator) |
| -3   | case number follows |
| -4   | question number follows (must be 1) |
| -6   | number of candidates follows (2 to 100) |
| -7 / -8 | start / end of vote info |
| -9 / -10 | start / end of one ballot (optional) |
| -11  | ballot repeat count follows |
| -14  | the next candidate ties the previous one |
| -50  | request plain IRV/STV (no pairwise loser elimination) |
| -65  | turn off detailed counting diagnostics |
| -67  | number of equivalent seats follows (required) |
| -68  | request the Droop quota instead of Hare |
| -77  | candidate to ignore follows (starts eliminated) |
| -78  | request the primitive STV treatment of shared rankings |

Candidates missing from a ballot are treated as one tied group ranked
below every marked candidate. Other codes from the wider voteinfo
registry are accepted and ignored.

## The result stream

Results are whitespace-separated integers terminated by `-2`. The option
requests are replayed first, then the per-cycle events in the order they
happened:

| Code | Meaning |
|------|---------|
| -69  | winner of the next seat follows |
| -73  | pairwise losing candidate (eliminated) follows |
| -74  | eliminated candidate follows |
| -70 / -71 | the candidates in between are tied for the next seat |

A `-70 ... -71` block at the end of a count reports an unresolved tie:
the case completed, but with fewer winners than seats.

## Methods

* One seat, pairwise loser elimination on (the default): **RCIPE**.
* One seat, `-50`: **IRV**. The winning quota is a simple majority.
* Several seats, pairwise loser elimination on: **RCIPE STV**.
* Several seats, `-50`: **STV**.

With several seats the quota is Hare, `1 + floor(votes / seats)`, unless
`-68` selects Droop, `1 + floor(votes / (seats + 1))`. After a candidate
reaches the quota, ballots supporting that candidate collectively lose
influence equal to the quota; the surplus share carries to later seats.
Whole ballots are zeroed, equally spaced across the supporting groups, so
the engine never assigns fractional influence.

*/
