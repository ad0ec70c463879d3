/*!

This is the long-form manual for `poll_tally` and `polltally`.

## Ballots

A ballot is one participant's full set of answers:

| key                 | type              | notes                                         |
|---------------------|-------------------|-----------------------------------------------|
| `name`              | string            | required, unique in the poll (ignoring case)  |
| `selectedWeekends`  | list of strings   | required, at least one entry                  |
| `canDrive`          | `true`/`false`/`null` | optional                                  |
| `hasIkonPass`       | `true`/`false`/`null` | optional                                  |
| `willingToPitchJet` | `true`/`false`/`null` | optional                                  |

Submitting a second ballot under the same name (with any capitalization)
replaces the first one, at the same position. There is no way to remove a
ballot other than replacing it.

## Results

The results are computed again from all the stored ballots every time they are requested:

```json
{
  "votes": [ ... ],
  "weekendStats": {
    "Jan 16-18": { "count": 1, "voters": ["Bob"], "percentage": 50 },
    "Feb 13-15": { "count": 2, "voters": ["ann", "Bob"], "percentage": 100 }
  },
  "driveStats": { "yes": 1, "no": 0, "total": 1 },
  "ikonStats": { "yes": 0, "no": 0, "total": 0 },
  "jetStats": { "yes": 0, "no": 1, "total": 1 }
}
```

- `count` is the number of ballots that selected the weekend. Listing the
  same weekend twice on a ballot counts once.
- `percentage` is `count` over the number of ballots, rounded half-up to a
  whole percent. It is 0 when there are no ballots.
- the yes/no statistics leave out the ballots that did not answer: `total`
  is `yes + no`, not the number of ballots.

## Storage

The ballots are stored as one JSON array, rewritten in full on every submission.

### Local file

The default. The array is written to `data/votes.json` (relative to the
working directory), or the path given by `POLL_DATA_FILE`, the `dataFile`
configuration option or the `--data-file` flag. The directory is created on
first use and a missing file is an empty poll.

### Key-value store

Used when both `KV_REST_API_URL` and `KV_REST_API_TOKEN` are set in the
environment. The array is stored under a single key (`mammoth-votes` unless
`POLL_KV_KEY` or `kvKey` says otherwise) through the REST interface of the
store. If the endpoint is not a valid `http(s)` URL, the local file is used
instead.

### Concurrent submissions

A submission reads the whole array, updates it and writes it back. Two
submissions for different voters arriving at the same time may overwrite
each other, and one of them is then lost. This is acceptable for a poll of a
few dozen people; a store with one key per voter would be needed beyond that.

## Configuration file

```json
{
  "dataFile": "data/votes.json",
  "kvKey": "mammoth-votes",
  "kvTimeoutMs": 5000
}
```

All the entries are optional. Flags override the environment, which
overrides the configuration file. The credentials of the key-value store are
only read from the environment.

*/
