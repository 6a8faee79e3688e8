//! Template resources and loading
//!
//! Templates are looked up by name through an ordered chain of
//! [`ResourceResolver`]s. The standard template ships inside the library and is
//! always reachable through [`EmbeddedResources`]; callers can add their own
//! contexts, such as a directory of customised templates.
//!
//! Resolved bytes are never edited in place: [`TemplateLoader::load`] copies
//! them into a fresh [`PackageBuffer`] for every conversion.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{OoxmlError, Result};
use crate::package::{DocumentPackage, PackageBuffer};

/// Name of the standard Markdown template
pub const STANDARD_TEMPLATE: &str = "mdocx.resources.markdown-template.v1.docx";

/// Placeholder text carried by the standard template's body
pub const STANDARD_PLACEHOLDER: &str = "{{content}}";

/// Bytes of the standard template
pub static STANDARD_TEMPLATE_BYTES: &[u8] = include_bytes!("../resources/markdown-template.docx");

/// A context that can produce resource bytes by name
pub trait ResourceResolver: Send + Sync {
    /// Bytes of the named resource, or `None` when this context lacks it
    fn resolve(&self, name: &str) -> Option<Cow<'static, [u8]>>;
}

impl<F> ResourceResolver for F
where
    F: Fn(&str) -> Option<Cow<'static, [u8]>> + Send + Sync,
{
    fn resolve(&self, name: &str) -> Option<Cow<'static, [u8]>> {
        self(name)
    }
}

/// Resources compiled into the binary
#[derive(Debug, Clone)]
pub struct EmbeddedResources {
    resources: HashMap<&'static str, &'static [u8]>,
}

impl EmbeddedResources {
    /// An empty table
    pub fn new() -> Self {
        Self {
            resources: HashMap::new(),
        }
    }

    /// The library's own resources
    pub fn standard() -> Self {
        Self::new().with(STANDARD_TEMPLATE, STANDARD_TEMPLATE_BYTES)
    }

    /// Builder: register a resource
    pub fn with(mut self, name: &'static str, bytes: &'static [u8]) -> Self {
        self.resources.insert(name, bytes);
        self
    }
}

impl Default for EmbeddedResources {
    fn default() -> Self {
        Self::standard()
    }
}

impl ResourceResolver for EmbeddedResources {
    fn resolve(&self, name: &str) -> Option<Cow<'static, [u8]>> {
        self.resources.get(name).map(|bytes| Cow::Borrowed(*bytes))
    }
}

/// Resources read from files in a directory, by file name
#[derive(Debug, Clone)]
pub struct DirectoryResolver {
    root: PathBuf,
}

impl DirectoryResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ResourceResolver for DirectoryResolver {
    fn resolve(&self, name: &str) -> Option<Cow<'static, [u8]>> {
        // Names are plain file names; anything path-like stays inside the root
        if name.is_empty() || name.contains(['/', '\\']) || name == ".." {
            return None;
        }
        let path = self.root.join(name);
        match std::fs::read(&path) {
            Ok(bytes) => {
                debug!(path = %path.display(), "Resolved resource from directory");
                Some(Cow::Owned(bytes))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read resource from directory");
                None
            }
        }
    }
}

/// Ordered resolvers; the first one that yields bytes wins
#[derive(Default)]
pub struct ResolverChain {
    resolvers: Vec<Box<dyn ResourceResolver>>,
}

impl ResolverChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: append a resolver
    pub fn with(mut self, resolver: impl ResourceResolver + 'static) -> Self {
        self.push(resolver);
        self
    }

    pub fn push(&mut self, resolver: impl ResourceResolver + 'static) {
        self.resolvers.push(Box::new(resolver));
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}

impl fmt::Debug for ResolverChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverChain")
            .field("resolvers", &self.resolvers.len())
            .finish()
    }
}

impl ResourceResolver for ResolverChain {
    fn resolve(&self, name: &str) -> Option<Cow<'static, [u8]>> {
        self.resolvers.iter().find_map(|r| r.resolve(name))
    }
}

/// Loads templates into fresh buffers
#[derive(Debug)]
pub struct TemplateLoader {
    chain: ResolverChain,
}

impl TemplateLoader {
    /// Loader backed by the embedded resources only
    pub fn new() -> Self {
        Self {
            chain: ResolverChain::new().with(EmbeddedResources::standard()),
        }
    }

    /// Loader backed by the given resolver only
    pub fn with_resolver(resolver: impl ResourceResolver + 'static) -> Self {
        Self {
            chain: ResolverChain::new().with(resolver),
        }
    }

    /// Builder: add a context tried after the existing ones
    pub fn with_fallback(mut self, resolver: impl ResourceResolver + 'static) -> Self {
        self.chain.push(resolver);
        self
    }

    /// Copy the named template into a new buffer
    pub fn load(&self, name: &str) -> Result<PackageBuffer> {
        let bytes = self
            .chain
            .resolve(name)
            .ok_or_else(|| OoxmlError::ResourceNotFound(name.to_string()))?;
        debug!(name, bytes = bytes.len(), "Loaded template");
        Ok(PackageBuffer::from_bytes(bytes.into_owned()))
    }

    /// Copy the standard template into a new buffer
    pub fn standard(&self) -> Result<PackageBuffer> {
        self.load(STANDARD_TEMPLATE)
    }

    /// Load a template, open it and run `f` on the package
    ///
    /// With `clean` set the package is reset before `f` runs. The package is
    /// closed when `f` succeeds; when `f` fails it is released without
    /// flushing and the error is returned.
    pub fn open<T, F>(&self, name: &str, clean: bool, f: F) -> Result<(PackageBuffer, T)>
    where
        F: FnOnce(&mut DocumentPackage<'_>) -> Result<T>,
    {
        let mut buffer = self.load(name)?;
        let mut package = buffer.open()?;
        if clean {
            package.clean();
        }
        let value = f(&mut package)?;
        package.close()?;
        Ok((buffer, value))
    }
}

impl Default for TemplateLoader {
    fn default() -> Self {
        Self::new()
    }
}
