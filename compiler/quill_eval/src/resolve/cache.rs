//! Descriptor cache for resolved host members.

use std::sync::Arc;

use dashmap::DashMap;
use quill_ir::Name;
use rustc_hash::FxBuildHasher;

use super::MemberKind;
use crate::host::{MethodDescriptor, TypeRef};

/// Bucket key: members of one type, one name, one argument count.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MemberKey {
    pub type_name: String,
    pub member: Name,
    pub argc: usize,
    pub kind: MemberKind,
}

impl MemberKey {
    pub fn new(ty: &TypeRef, member: &str, argc: usize, kind: MemberKind) -> Self {
        MemberKey {
            type_name: ty.name().to_string(),
            member: Name::from(member),
            argc,
            kind,
        }
    }
}

/// Members that matched before, per [`MemberKey`].
///
/// Buckets only grow. A member is listed once per bucket no matter how
/// many sites resolved to it.
#[derive(Default)]
pub struct MemberCache {
    buckets: DashMap<MemberKey, Vec<Arc<MethodDescriptor>>, FxBuildHasher>,
}

impl MemberCache {
    pub fn new() -> Self {
        MemberCache::default()
    }

    pub fn candidates(&self, key: &MemberKey) -> Vec<Arc<MethodDescriptor>> {
        self.buckets
            .get(key)
            .map(|bucket| bucket.value().clone())
            .unwrap_or_default()
    }

    pub fn insert(&self, key: MemberKey, method: &Arc<MethodDescriptor>) {
        let mut bucket = self.buckets.entry(key).or_default();
        if bucket.iter().any(|known| Arc::ptr_eq(known, method)) {
            return;
        }
        tracing::debug!(
            ty = %bucket.key().type_name,
            member = %bucket.key().member,
            argc = bucket.key().argc,
            "cached host member"
        );
        bucket.push(method.clone());
    }

    /// Number of buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn clear(&self) {
        self.buckets.clear();
    }
}
