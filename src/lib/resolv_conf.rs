// SPDX-License-Identifier: Apache-2.0

use std::path::Path;
use std::str::FromStr;

use crate::{file::read_file, ErrorKind, NetRenderError};

pub(crate) const MAX_NAMESERVERS: usize = 3;
pub(crate) const MAX_SEARCH_DOMAINS: usize = 6;
pub(crate) const MAX_SEARCH_LEN: usize = 256;

const OPT_NAMESERVER: &str = "nameserver";
const OPT_DOMAIN: &str = "domain";
const OPT_SEARCH: &str = "search";
const SUPPORTED_OPTIONS: [&str; 5] =
    [OPT_NAMESERVER, OPT_DOMAIN, OPT_SEARCH, "sortlist", "options"];
const COMMENT_CHARS: [char; 2] = [';', '#'];

#[derive(Debug, Clone, PartialEq, Eq)]
enum ResolvConfLine {
    Blank(String),
    AllComment(String),
    Option {
        name: String,
        value: String,
        // Including the whitespace before the comment character
        trailing_comment: String,
    },
}

impl ResolvConfLine {
    fn new_option(name: &str, value: &str) -> Self {
        Self::Option {
            name: name.to_string(),
            value: value.to_string(),
            trailing_comment: String::new(),
        }
    }

    fn option_value(&self, opt_name: &str) -> Option<&str> {
        match self {
            Self::Option { name, value, .. } if name == opt_name => {
                Some(value.as_str())
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for ResolvConfLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blank(line) | Self::AllComment(line) => write!(f, "{line}"),
            Self::Option {
                name,
                value,
                trailing_comment,
            } => write!(f, "{name} {value}{trailing_comment}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// The `resolv.conf` file of DNS resolver.
///
/// Blank and comment lines are kept untouched in their original position.
/// Modifying name servers, search list or local domain moves the affected
/// option lines to the end of file.
///
/// ```
/// use netrender::ResolvConf;
///
/// let mut conf: ResolvConf = "# local\nnameserver 192.0.2.1\n".parse().unwrap();
/// conf.add_nameserver("192.0.2.2").unwrap();
/// assert_eq!(
///     conf.to_string(),
///     "# local\nnameserver 192.0.2.1\nnameserver 192.0.2.2\n"
/// );
/// ```
pub struct ResolvConf {
    lines: Vec<ResolvConfLine>,
}

impl FromStr for ResolvConf {
    type Err = NetRenderError;

    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let mut lines = Vec::new();
        for (index, line) in content.lines().enumerate() {
            lines.push(parse_line(line, index + 1)?);
        }
        Ok(Self { lines })
    }
}

impl std::fmt::Display for ResolvConf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for line in self.lines.iter() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

fn parse_line(
    line: &str,
    line_number: usize,
) -> Result<ResolvConfLine, NetRenderError> {
    let stripped = line.trim();
    if stripped.is_empty() {
        return Ok(ResolvConfLine::Blank(line.to_string()));
    }
    if stripped.starts_with(COMMENT_CHARS) {
        return Ok(ResolvConfLine::AllComment(line.to_string()));
    }

    let (head, comment) = match stripped.find(COMMENT_CHARS) {
        Some(pos) => stripped.split_at(pos),
        None => (stripped, ""),
    };
    let value_end = head.trim_end().len();
    let trailing_comment = format!("{}{}", &head[value_end..], comment);
    let head = &head[..value_end];

    let (name, value) = match head.split_once(char::is_whitespace) {
        Some((name, value)) => (name, value.trim_start()),
        None => (head, ""),
    };
    if !SUPPORTED_OPTIONS.contains(&name) {
        return Err(NetRenderError::new_malformed_line(
            format!("Unexpected resolv.conf option {name}"),
            line,
            line_number,
        ));
    }
    if value.is_empty() {
        return Err(NetRenderError::new_malformed_line(
            format!("No value defined for resolv.conf option {name}"),
            line,
            line_number,
        ));
    }
    Ok(ResolvConfLine::Option {
        name: name.to_string(),
        value: value.to_string(),
        trailing_comment,
    })
}

impl ResolvConf {
    pub fn new() -> Self {
        Self::default()
    }

    fn get_option_values(&self, opt_name: &str) -> Vec<&str> {
        self.lines
            .iter()
            .filter_map(|l| l.option_value(opt_name))
            .collect()
    }

    fn remove_option(&mut self, opt_name: &str) {
        self.lines.retain(|l| l.option_value(opt_name).is_none());
    }

    /// Name servers in file order.
    pub fn nameservers(&self) -> Vec<String> {
        self.get_option_values(OPT_NAMESERVER)
            .into_iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// The first `domain` option.
    pub fn local_domain(&self) -> Option<String> {
        self.get_option_values(OPT_DOMAIN)
            .first()
            .map(|s| s.to_string())
    }

    /// Replace all `domain` options with the specified one placed at the end
    /// of file.
    pub fn set_local_domain(&mut self, domain: &str) {
        self.remove_option(OPT_DOMAIN);
        self.lines
            .push(ResolvConfLine::new_option(OPT_DOMAIN, domain));
    }

    /// Search domains of all `search` options.
    pub fn search_domains(&self) -> Vec<String> {
        self.get_option_values(OPT_SEARCH)
            .into_iter()
            .flat_map(|v| v.split_whitespace())
            .map(|s| s.to_string())
            .collect()
    }

    /// Append a name server. Adding an existing name server changes nothing.
    /// Return the name servers after the change.
    pub fn add_nameserver(
        &mut self,
        nameserver: &str,
    ) -> Result<Vec<String>, NetRenderError> {
        let cur_nameservers = self.nameservers();
        let mut new_nameservers = unique_list(cur_nameservers.as_slice());
        if cur_nameservers.iter().any(|n| n == nameserver) {
            return Ok(cur_nameservers);
        }
        if new_nameservers.len() >= MAX_NAMESERVERS {
            return Err(NetRenderError::new(
                ErrorKind::CapacityExceeded,
                format!(
                    "Adding {nameserver} would go beyond the \
                    {MAX_NAMESERVERS} maximum nameservers"
                ),
            ));
        }
        new_nameservers.push(nameserver.to_string());
        self.remove_option(OPT_NAMESERVER);
        for ns in new_nameservers.iter() {
            self.lines
                .push(ResolvConfLine::new_option(OPT_NAMESERVER, ns));
        }
        Ok(new_nameservers)
    }

    /// Append a search domain. Adding an existing domain changes nothing.
    /// Return the search domains after the change.
    pub fn add_search_domain(
        &mut self,
        domain: &str,
    ) -> Result<Vec<String>, NetRenderError> {
        let cur_domains = self.search_domains();
        if cur_domains.iter().any(|d| d == domain) {
            return Ok(cur_domains);
        }
        let mut new_domains = unique_list(cur_domains.as_slice());
        if new_domains.len() >= MAX_SEARCH_DOMAINS {
            return Err(NetRenderError::new(
                ErrorKind::CapacityExceeded,
                format!(
                    "Adding {domain} would go beyond the \
                    {MAX_SEARCH_DOMAINS} maximum search domains"
                ),
            ));
        }
        new_domains.push(domain.to_string());
        let search_line = new_domains.join(" ");
        if search_line.len() > MAX_SEARCH_LEN {
            return Err(NetRenderError::new(
                ErrorKind::CapacityExceeded,
                format!(
                    "Adding {domain} would go beyond the \
                    {MAX_SEARCH_LEN} maximum search list character limit"
                ),
            ));
        }
        self.remove_option(OPT_SEARCH);
        self.lines
            .push(ResolvConfLine::new_option(OPT_SEARCH, &search_line));
        Ok(new_domains)
    }

    /// Add each entry in order, logging the ones rejected by resolver
    /// limits.
    pub(crate) fn merge_dns(
        &mut self,
        nameservers: &[String],
        search: &[String],
    ) {
        for server in nameservers {
            if let Err(e) = self.add_nameserver(server.as_str()) {
                log::warn!("Failed to add nameserver {server}: {e}");
            }
        }
        for domain in search {
            if let Err(e) = self.add_search_domain(domain.as_str()) {
                log::warn!("Failed to add search domain {domain}: {e}");
            }
        }
    }
}

/// Existing `resolv.conf`, or an empty one if it is missing or not
/// parsable.
pub(crate) fn load_resolv_conf(path: &Path) -> ResolvConf {
    let content = match read_file(path) {
        Ok(Some(c)) => c,
        Ok(None) => return ResolvConf::new(),
        Err(e) => {
            log::warn!("Failed to read {}: {e}", path.display());
            return ResolvConf::new();
        }
    };
    match ResolvConf::from_str(&content) {
        Ok(r) => r,
        Err(e) => {
            log::warn!(
                "Ignoring existing {} as it is malformed: {e}",
                path.display()
            );
            ResolvConf::new()
        }
    }
}

fn unique_list(items: &[String]) -> Vec<String> {
    let mut ret: Vec<String> = Vec::new();
    for item in items {
        if !ret.contains(item) {
            ret.push(item.clone());
        }
    }
    ret
}
