//! Slug derivation and shareable-path resolution.
//!
//! Slugs are collection-unique, case-insensitively. A collaborator mounts a
//! split's slug under a base path (e.g. `/smart-food-splitter/dominos-lunch`)
//! and hands inbound path segments back to [`resolve_selection`].

use crate::core::split::Split;
use std::collections::HashSet;

/// Slug used when a name has no usable characters.
pub const FALLBACK_SLUG: &str = "split";

/// Lowercases a name and collapses every run of characters outside `[a-z0-9]`
/// into a single hyphen, trimming hyphens at both ends.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.trim().to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// The slug a split currently occupies: its stored slug, or the one derived from
/// its name when none is stored yet.
#[must_use]
pub fn effective_slug(split: &Split) -> String {
    if split.slug.is_empty() {
        slugify(&split.name)
    } else {
        split.slug.to_lowercase()
    }
}

/// Derives a slug for `name` that no other split uses.
///
/// The split identified by `excluding` is ignored so a rename does not collide
/// with its own current slug. On collision `-2`, `-3`, ... is appended.
#[must_use]
pub fn unique_slug(name: &str, splits: &[Split], excluding: Option<i64>) -> String {
    let base = slugify(name);
    let taken: HashSet<String> = splits
        .iter()
        .filter(|s| Some(s.id) != excluding)
        .map(effective_slug)
        .collect();

    let mut slug = base.clone();
    let mut suffix = 2;
    while taken.contains(&slug) {
        slug = format!("{base}-{suffix}");
        suffix += 1;
    }
    slug
}

/// Fills in missing slugs in place, in list order.
///
/// Each derived slug is checked against the list as hydrated so far, so two
/// slug-less splits with the same name still end up distinct.
pub fn ensure_slugs(splits: &mut [Split]) {
    for idx in 0..splits.len() {
        if !splits[idx].slug.is_empty() {
            continue;
        }
        let name = if splits[idx].name.is_empty() {
            format!("split-{}", idx + 1)
        } else {
            splits[idx].name.clone()
        };
        let slug = unique_slug(&name, splits, Some(splits[idx].id));
        tracing::debug!(split_id = splits[idx].id, slug = %slug, "Derived missing slug");
        splits[idx].slug = slug;
    }
}

/// Shareable path for a split under the given base path.
#[must_use]
pub fn share_path(base_path: &str, split: &Split) -> String {
    format!("{}/{}", base_path.trim_end_matches('/'), split.slug)
}

/// Extracts the slug segment from an inbound URL path: the last non-empty
/// segment after the base path, if any.
#[must_use]
pub fn path_segment<'a>(path: &'a str, base_path: &str) -> Option<&'a str> {
    let trimmed = path.strip_prefix(base_path).unwrap_or(path);
    trimmed.split('/').filter(|part| !part.is_empty()).last()
}

/// Finds a split by slug, case-insensitively.
#[must_use]
pub fn find_by_slug<'a>(splits: &'a [Split], slug: &str) -> Option<&'a Split> {
    let wanted = slug.to_lowercase();
    splits.iter().find(|s| s.slug.to_lowercase() == wanted)
}

/// Resolves which split to select: the one matching the path segment, else the
/// previously selected one if it still exists, else the first, else none.
#[must_use]
pub fn resolve_selection(
    splits: &[Split],
    segment: Option<&str>,
    previous: Option<i64>,
) -> Option<i64> {
    segment
        .and_then(|slug| find_by_slug(splits, slug))
        .map(|s| s.id)
        .or_else(|| previous.filter(|id| splits.iter().any(|s| s.id == *id)))
        .or_else(|| splits.first().map(|s| s.id))
}
