//! Request model: path parsing, geometry classification, output format
//! negotiation, and cache key derivation.

use std::fmt;

/// Immutable description of one download request, built once per request.
///
/// `directory` and `filename` are opaque path text. `geometry` is the
/// URL-decoded transform token: a dimension expression (`"2x2#"`), or one of
/// the sentinels `"original"` and `"remote"`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub tenant_host: String,
    pub directory: String,
    pub geometry: String,
    pub filename: String,
}

impl RequestDescriptor {
    /// Parse a request into a descriptor.
    ///
    /// Handles paths of the form `/view/<directory>/<geometry>/<filename>`,
    /// where `<directory>` may itself contain slashes and `<geometry>` and
    /// `<filename>` are percent-encoded single segments. Returns `None` for
    /// any other path, including `/view/` paths with fewer than three
    /// trailing segments; those requests fall through to the next handler.
    pub fn parse(tenant_host: &str, path: &str) -> Option<Self> {
        let rest = path.strip_prefix("/view/")?;

        let (prefix, filename) = rest.rsplit_once('/')?;
        let (directory, geometry) = prefix.rsplit_once('/')?;
        if directory.is_empty() || geometry.is_empty() || filename.is_empty() {
            return None;
        }

        let geometry = urlencoding::decode(geometry).ok()?.into_owned();
        let filename = urlencoding::decode(filename).ok()?.into_owned();

        Some(Self {
            tenant_host: strip_port(tenant_host).to_string(),
            directory: directory.to_string(),
            geometry,
            filename,
        })
    }

    /// Object key within the tenant's remote bucket
    pub fn object_key(&self) -> String {
        format!("{}/{}", self.directory, self.filename)
    }
}

/// Drop a `:port` suffix from a host header value
fn strip_port(host: &str) -> &str {
    host.split(':').next().unwrap_or(host)
}

/// Classified geometry token
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Geometry {
    /// Serve the stored bytes unmodified
    Original,
    /// Redirect to the object's remote location, transferring nothing
    Remote,
    /// Render through the thumbnail pipeline; carries the raw token
    Dimensions(String),
}

impl Geometry {
    pub fn classify(token: &str) -> Self {
        match token {
            "original" => Geometry::Original,
            "remote" => Geometry::Remote,
            _ => Geometry::Dimensions(token.to_string()),
        }
    }
}

/// Output encodings the gateway produces.
///
/// The content type is derived from the requested filename's extension,
/// independent of the actual encoding of the stored bytes: `.jpg`/`.jpeg`
/// in any case produces JPEG, everything else (including non-image
/// extensions) defaults to PNG.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
}

impl OutputFormat {
    pub fn from_filename(filename: &str) -> Self {
        let ext = filename.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
        if ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg") {
            OutputFormat::Jpeg
        } else {
            OutputFormat::Png
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
        }
    }
}

/// Deterministic identifier for a cached byte payload.
///
/// Originals are keyed by `tenant/directory/filename`; rendered variants
/// append the geometry token. Identical requests always derive identical
/// keys, which is what makes cache dedup work.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key for the original object bytes
    pub fn original(descriptor: &RequestDescriptor) -> Self {
        CacheKey(format!(
            "{}/{}/{}",
            descriptor.tenant_host, descriptor.directory, descriptor.filename
        ))
    }

    /// Key for a rendered variant of the object
    pub fn rendered(descriptor: &RequestDescriptor, geometry: &str) -> Self {
        CacheKey(format!(
            "{}/{}/{}/{}",
            descriptor.tenant_host, descriptor.directory, descriptor.filename, geometry
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_path() {
        let d = RequestDescriptor::parse("example.com", "/view/avatars/2x2%23/hello.gif").unwrap();
        assert_eq!(d.tenant_host, "example.com");
        assert_eq!(d.directory, "avatars");
        assert_eq!(d.geometry, "2x2#");
        assert_eq!(d.filename, "hello.gif");
    }

    #[test]
    fn test_parse_nested_directory() {
        let d =
            RequestDescriptor::parse("example.com", "/view/users/42/avatars/original/pic.png")
                .unwrap();
        assert_eq!(d.directory, "users/42/avatars");
        assert_eq!(d.geometry, "original");
        assert_eq!(d.filename, "pic.png");
    }

    #[test]
    fn test_parse_strips_host_port() {
        let d = RequestDescriptor::parse("example.com:8084", "/view/a/original/b.png").unwrap();
        assert_eq!(d.tenant_host, "example.com");
    }

    #[test]
    fn test_parse_decodes_filename() {
        let d =
            RequestDescriptor::parse("example.com", "/view/a/remote/hello%20world.jpg").unwrap();
        assert_eq!(d.filename, "hello world.jpg");
    }

    #[test]
    fn test_parse_rejects_short_paths() {
        assert!(RequestDescriptor::parse("example.com", "/view/onlyone").is_none());
        assert!(RequestDescriptor::parse("example.com", "/view/two/segments").is_none());
        assert!(RequestDescriptor::parse("example.com", "/view/a//b.png").is_none());
    }

    #[test]
    fn test_parse_ignores_other_paths() {
        assert!(RequestDescriptor::parse("example.com", "/api/v1/health").is_none());
        assert!(RequestDescriptor::parse("example.com", "/").is_none());
    }

    #[test]
    fn test_geometry_classification() {
        assert_eq!(Geometry::classify("original"), Geometry::Original);
        assert_eq!(Geometry::classify("remote"), Geometry::Remote);
        assert_eq!(
            Geometry::classify("2x2#"),
            Geometry::Dimensions("2x2#".to_string())
        );
    }

    #[test]
    fn test_output_format_extension_rule() {
        assert_eq!(OutputFormat::from_filename("hello.jpg"), OutputFormat::Jpeg);
        assert_eq!(OutputFormat::from_filename("hello.JPg"), OutputFormat::Jpeg);
        assert_eq!(OutputFormat::from_filename("hello.jpeg"), OutputFormat::Jpeg);
        assert_eq!(OutputFormat::from_filename("hello.PdF"), OutputFormat::Png);
        assert_eq!(OutputFormat::from_filename("hello.gif"), OutputFormat::Png);
        assert_eq!(OutputFormat::from_filename("noextension"), OutputFormat::Png);
    }

    #[test]
    fn test_cache_key_derivation() {
        let d = RequestDescriptor {
            tenant_host: "example.com".into(),
            directory: "avatars".into(),
            geometry: "2x2#".into(),
            filename: "hello.gif".into(),
        };
        assert_eq!(
            CacheKey::original(&d).as_str(),
            "example.com/avatars/hello.gif"
        );
        assert_eq!(
            CacheKey::rendered(&d, "2x2#").as_str(),
            "example.com/avatars/hello.gif/2x2#"
        );
    }
}
