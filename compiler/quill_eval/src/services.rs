//! Process-scoped services shared by every interpreter of an engine.
//!
//! Nothing here is a static: an engine builds one `Services` and hands an
//! `Arc` of it to each interpreter, function value and session. Tests
//! build their own for isolation.

use std::fmt;
use std::sync::Arc;

use quill_ir::SourceParser;

use crate::host::TypeRegistry;
use crate::natives::NativeRegistry;
use crate::resolve::{ExtensionRegistry, MemberCache};
use crate::tree_cache::TreeCache;

pub struct Services {
    pub types: TypeRegistry,
    /// Host members matched by earlier resolutions.
    pub members: MemberCache,
    pub extensions: ExtensionRegistry,
    pub natives: NativeRegistry,
    pub parser: Arc<dyn SourceParser>,
    pub trees: TreeCache,
}

impl Services {
    /// Services with built-in types only and no natives.
    pub fn new(parser: Arc<dyn SourceParser>) -> Self {
        Services {
            types: TypeRegistry::new(),
            members: MemberCache::new(),
            extensions: ExtensionRegistry::new(),
            natives: NativeRegistry::new(),
            parser,
            trees: TreeCache::new(),
        }
    }
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services")
            .field("cached_members", &self.members.len())
            .field("natives", &self.natives.len())
            .field("trees", &self.trees.len())
            .finish_non_exhaustive()
    }
}
