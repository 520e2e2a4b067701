/*!

This is the long-form manual for `streak_scoring` and the `attendance` command.

## Scoring rules

Attendance is taken once per session-day. Each person has one record per session
(`morning`, `afternoon`), and the two sessions never share a record.

A *run* is a sequence of consecutive present days. Every run is scored on its own:

| run length | awards                                            |
|------------|---------------------------------------------------|
| 0 to 2     | nothing                                           |
| 3 to 6     | one 3-day award                                   |
| 7 or more  | one 7-day award, then the remaining days are scored again |

Some examples:

| history             | runs    | 3-day | 7-day |
|---------------------|---------|-------|-------|
| `xxx`               | 3       | 1     | 0     |
| `xxxxxxx`           | 7       | 0     | 1     |
| `xxxxxxxxxx`        | 10      | 1     | 1     |
| `xxxxxxxxxxxxxx`    | 14      | 0     | 2     |
| `x.xx`              | 1, 2    | 0     | 0     |

The awards are converted into points by the `points` section of the settings
(by default 1 point per 3-day award and 3 points per 7-day award).

## Retention

A record keeps at most `2 * max_days` days of history (14 days with the default
`max_days: 7`), and the cached run lengths those days can hold. The summary report resets all the records, so in normal use the
window is never reached.

## Files

All the files live under the root directory (`--root`, by default the current
directory):

* `settings.yml` the settings, created with default values when missing
* `data/morning_data.json`, `data/afternoon_data.json` one record per person
* `data/breakpoint.json` the pending selections, per session
* `reports/` the generated summary reports

### `settings.yml`

```yaml
points:
  _3_days: 1
  _7_days: 3
timer:
  on: true
  morning: "7:05"
  afternoon: "13:05"
display:
  pronoun: students
namelist:
  - alice
  - bob
max_days: 7
```

Every section is optional: missing values take the defaults shown above.

### Session data

Each entry maps a name to a record:

```json
{
  "alice": {
    "scoring": [3, 0, 2],
    "history": [true, true, true, false, true, true],
    "max_days": 7,
    "current_day": 6
  }
}
```

Malformed records are not an error: the fields that cannot be read are
replaced by the values of an empty record.

## Commands

* `attendance record morning alice bob` records the morning session now. Everybody
  on the roster who is not listed is marked absent.
* `attendance hold morning alice` saves a pending selection without recording it.
* `attendance pending morning` shows the pending selection.
* `attendance submit morning` records the pending selection.
* `attendance watch morning` waits until the time configured in `timer.morning`,
  then records the pending selection. Type `q` to close it before it fires.
* `attendance status morning` prints the current streaks and awards.
* `attendance report` writes the summary report and starts a new period.
* `attendance settings` prints the settings in use.

*/
