const MXC_SCHEME: &str = "mxc://";
const DOWNLOAD_PATH: &str = "/_matrix/media/r0/download";

/// Maps `mxc://<server>/<media_id>[#fragment]` onto the homeserver's
/// download endpoint. Anything else is not resolvable.
pub fn mxc_to_http(base_url: &str, mxc_url: &str) -> Option<String> {
    let rest = mxc_url.strip_prefix(MXC_SCHEME)?;
    let (path, fragment) = match rest.split_once('#') {
        Some((path, fragment)) => (path, Some(fragment)),
        None => (rest, None),
    };

    let (server_name, media_id) = path.split_once('/')?;
    if server_name.is_empty() || media_id.is_empty() || media_id.contains('/') {
        return None;
    }

    let mut url = format!(
        "{}{DOWNLOAD_PATH}/{server_name}/{media_id}",
        base_url.trim_end_matches('/')
    );
    if let Some(fragment) = fragment {
        url.push('#');
        url.push_str(fragment);
    }

    Some(url)
}
