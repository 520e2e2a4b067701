// The pending selections: names ticked for a session but not submitted yet.
// The file maps a session name to the list of selected names.

use crate::store::*;

type Breakpoints = BTreeMap<String, Vec<String>>;

fn read_breakpoints(path: &Path) -> StoreResult<Breakpoints> {
    let js = match read_json(path)? {
        Some(js) => js,
        None => return Ok(BTreeMap::new()),
    };
    let res: Breakpoints = serde_json::from_value(js).context(ParsingJsonSnafu {
        path: display_path(path),
    })?;
    Ok(res)
}

fn write_breakpoints(path: &Path, bps: &Breakpoints) -> StoreResult<()> {
    let js = serde_json::to_value(bps).context(ParsingJsonSnafu {
        path: display_path(path),
    })?;
    write_json(path, &js)
}

/// The pending selection of the session, empty if there is none.
pub fn load_breakpoint(path: &Path, session: Session) -> StoreResult<Vec<String>> {
    let mut bps = read_breakpoints(path)?;
    Ok(bps.remove(session.as_str()).unwrap_or_default())
}

pub fn save_breakpoint(path: &Path, session: Session, names: &[String]) -> StoreResult<()> {
    let mut bps = read_breakpoints(path)?;
    bps.insert(session.as_str().to_string(), names.to_vec());
    debug!("save_breakpoint: {}: {:?}", session, names);
    write_breakpoints(path, &bps)
}

/// Drops the pending selection of the session. The file is removed once no
/// session has a pending selection.
pub fn clear_breakpoint(path: &Path, session: Session) -> StoreResult<()> {
    if !path.exists() {
        return Ok(());
    }
    let mut bps = read_breakpoints(path)?;
    bps.remove(session.as_str());
    if bps.is_empty() {
        debug!("clear_breakpoint: no pending selection left, removing {:?}", path);
        remove_file(path)
    } else {
        write_breakpoints(path, &bps)
    }
}
