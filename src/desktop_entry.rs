use crate::error::ParseError;
use crate::exec::parse_exec;
use crate::model::AppEntry;
use log::{debug, trace, warn};
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

pub const MAIN_GROUP: &str = "Desktop Entry";
pub const ACTION_GROUP_PREFIX: &str = "Desktop Action";

/// The raw lines of one `[Group]`, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group<'a> {
    pub name: String,
    pub lines: Vec<&'a str>,
}

impl Group<'_> {
    pub fn is_main(&self) -> bool {
        self.name == MAIN_GROUP
    }

    pub fn is_action(&self) -> bool {
        self.name.starts_with(ACTION_GROUP_PREFIX)
    }
}

/// Splits descriptor text into groups. Blank lines and comments are dropped,
/// lines before the first header are ignored.
pub fn split_groups(content: &str) -> Vec<Group<'_>> {
    let mut groups: Vec<Group<'_>> = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            let name = match line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                Some(name) => name.trim().to_string(),
                None => {
                    warn!("Bad group header {:?}, its keys will be ignored", line);
                    String::new()
                }
            };
            trace!("Entering group [{}]", name);
            groups.push(Group { name, lines: Vec::new() });
            continue;
        }

        match groups.last_mut() {
            Some(group) => group.lines.push(line),
            None => debug!("Ignoring line outside of any group: {:?}", line),
        }
    }

    groups
}

/// Reads `Key=Value` lines into a map. Only the first `=` splits, so values
/// such as `--arg=1` survive intact. Later duplicates win.
pub fn parse_group_fields<'a, I>(lines: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut fields = HashMap::new();
    for line in lines {
        match line.split_once('=') {
            Some((key, value)) => {
                fields.insert(key.trim().to_string(), value.trim().to_string());
            }
            None => debug!("Ignoring line without '=': {:?}", line),
        }
    }
    fields
}

/// Maps one group's fields to an entry.
///
/// `Ok(None)` means the group is valid but must not be shown: it is hidden
/// (`Hidden` or `NoDisplay`) or describes something other than an application.
pub fn entry_from_fields(fields: &HashMap<String, String>) -> Result<Option<AppEntry>, ParseError> {
    let flag = |key: &str| fields.get(key).is_some_and(|v| parse_bool(key, v));

    if flag("Hidden") || flag("NoDisplay") {
        return Ok(None);
    }

    if let Some(kind) = fields.get("Type") {
        if kind != "Application" {
            debug!("Skipping non-application entry of type {:?}", kind);
            return Ok(None);
        }
    }

    let name = fields.get("Name").ok_or(ParseError::MissingKey("Name"))?;
    let exec = fields.get("Exec").ok_or(ParseError::MissingKey("Exec"))?;

    Ok(Some(AppEntry {
        name: name.clone(),
        generic_name: fields.get("GenericName").cloned().unwrap_or_default(),
        command: parse_exec(exec)?,
        terminal: flag("Terminal"),
        keywords: parse_string_list(fields.get("Keywords").map(String::as_str)),
        hidden: false,
        working_dir: fields.get("Path").filter(|p| !p.is_empty()).map(PathBuf::from),
    }))
}

/// Parses a whole descriptor: the main entry first, then its actions in file
/// order when `actions_enabled` is set. A hidden or non-application main
/// group takes its actions with it.
pub fn parse_desktop_entries(content: &str, actions_enabled: bool) -> Vec<AppEntry> {
    let groups = split_groups(content);
    let mut main = None;
    let mut actions = Vec::new();

    for group in &groups {
        if group.is_main() {
            if main.is_some() {
                warn!("Duplicate [{}] group, ignoring the later one", MAIN_GROUP);
                continue;
            }
            main = Some(group);
        } else if group.is_action() {
            if actions_enabled {
                actions.push(group);
            }
        } else {
            trace!("Ignoring group [{}]", group.name);
        }
    }

    let mut entries = Vec::new();
    match main {
        Some(group) => match group_entry(group) {
            Ok(Some(entry)) => entries.push(entry),
            Ok(None) => {
                debug!("[{}] is hidden or not an application, dropping the file", MAIN_GROUP);
                return entries;
            }
            Err(_) => {}
        },
        None => debug!("No [{}] group found", MAIN_GROUP),
    }

    entries.extend(actions.into_iter().filter_map(|group| group_entry(group).ok().flatten()));
    entries
}

fn group_entry(group: &Group<'_>) -> Result<Option<AppEntry>, ParseError> {
    let fields = parse_group_fields(group.lines.iter().copied());
    entry_from_fields(&fields).inspect_err(|e| {
        warn!("Skipping group [{}] ({:?}): {}", group.name, fields.get("Name"), e);
    })
}

/// Case-insensitive `true`/`false`; anything else is logged and read as false.
pub fn parse_bool(key: &str, value: &str) -> bool {
    match value.to_lowercase().as_str() {
        "true" => true,
        "false" => false,
        other => {
            warn!("Unrecognised boolean {:?} for key {}, assuming false", other, key);
            false
        }
    }
}

/// `a;b;c\;d;` -> {a, b, c;d}
fn parse_string_list(input: Option<&str>) -> BTreeSet<String> {
    let mut result = BTreeSet::new();
    let mut current = String::new();
    let mut chars = input.unwrap_or("").chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(';') => current.push(';'),
                Some(n) => {
                    current.push('\\');
                    current.push(n);
                }
                None => current.push('\\'),
            },
            ';' => {
                let item = std::mem::take(&mut current);
                if !item.trim().is_empty() {
                    result.insert(item.trim().to_string());
                }
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        result.insert(current.trim().to_string());
    }
    result
}
