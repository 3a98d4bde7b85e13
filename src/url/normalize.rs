use crate::url::domain::is_valid_hostname;
use crate::url::{ProbeTarget, Scheme};
use crate::UrlError;
use url::{Host, Url};

/// Parses an input line into a probe target
///
/// # Parsing Steps
///
/// 1. Trim whitespace; reject empty input
/// 2. If the input carries `scheme://`, accept only http and https
/// 3. Parse the rest as a URL (a placeholder scheme is used when none is given)
/// 4. Lowercase the host and validate it (domain labels or an IP literal)
/// 5. Remember an explicit port, even one that equals the placeholder's default
/// 6. Drop the fragment
///
/// # Arguments
///
/// * `input` - One line from the domain list
///
/// # Returns
///
/// * `Ok(ProbeTarget)` - A target the prober can request
/// * `Err(UrlError)` - The input cannot name a host
///
/// # Examples
///
/// ```
/// use subprobe::url::parse_target;
///
/// let target = parse_target("  Mail.Example.COM ").unwrap();
/// assert_eq!(target.host, "mail.example.com");
/// assert!(target.scheme.is_none());
///
/// assert!(parse_target("bad!!domain").is_err());
/// ```
pub fn parse_target(input: &str) -> Result<ProbeTarget, UrlError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(UrlError::Empty);
    }

    let (scheme, rest) = match input.split_once("://") {
        Some((name, rest)) => {
            let scheme =
                Scheme::from_name(name).ok_or_else(|| UrlError::InvalidScheme(name.to_string()))?;
            (Some(scheme), rest)
        }
        None => (None, input),
    };

    let placeholder = scheme.unwrap_or(Scheme::Http);
    let mut base = Url::parse(&format!("{}://{}", placeholder, rest))
        .map_err(|e| UrlError::Parse(format!("{}: {}", input, e)))?;

    match base.host() {
        Some(Host::Domain(domain)) => {
            if !is_valid_hostname(domain) {
                return Err(UrlError::InvalidHost(domain.to_string()));
            }
        }
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => {}
        None => return Err(UrlError::MissingDomain(input.to_string())),
    }

    let host = base
        .host_str()
        .map(|h| h.to_lowercase())
        .ok_or_else(|| UrlError::MissingDomain(input.to_string()))?;

    base.set_fragment(None);

    let port = match scheme {
        Some(_) => base.port(),
        None => base.port().or_else(|| explicit_port(rest)),
    };

    Ok(ProbeTarget {
        input: input.to_string(),
        host,
        scheme,
        port,
        base,
    })
}

/// Extracts a port written in the authority part of a schemeless input
///
/// `Url` drops a port equal to the scheme default, which would lose `:80`
/// when the placeholder scheme is later swapped for https.
fn explicit_port(rest: &str) -> Option<u16> {
    let authority = rest.split(['/', '?', '#']).next().unwrap_or(rest);
    let authority = authority.rsplit('@').next().unwrap_or(authority);
    let (_, port) = authority.rsplit_once(':')?;
    if port.contains(']') {
        return None;
    }
    port.parse().ok()
}
