//! Project media editing model.
//!
//! The admin workflow edits a project's images, before/after pairs and
//! hero selection in memory, then persists the whole set in one
//! transactional save. This module holds that in-memory representation
//! and the rules it must keep: the `before`/`after` tags are mutually
//! exclusive on an image, a pair never uses the same image on both
//! sides, deleting an image clears the pair sides that referenced it,
//! and pair labels are renumbered to match their position after any
//! structural change to the pair collection.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::warn;

use crate::db::Database;
use crate::storage::MediaStore;

/// Default cap on before/after pairs per project.
pub const DEFAULT_MAX_PAIRS: usize = 8;

/// Category tag attached to a project image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageTag {
    Before,
    After,
    Gallery,
}

impl ImageTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageTag::Before => "before",
            ImageTag::After => "after",
            ImageTag::Gallery => "gallery",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "before" => Some(ImageTag::Before),
            "after" => Some(ImageTag::After),
            "gallery" => Some(ImageTag::Gallery),
            _ => None,
        }
    }

    /// The tag this one cannot share an image with, if any.
    fn counterpart(&self) -> Option<ImageTag> {
        match self {
            ImageTag::Before => Some(ImageTag::After),
            ImageTag::After => Some(ImageTag::Before),
            ImageTag::Gallery => None,
        }
    }
}

/// One image in a project's collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectImage {
    pub id: i64,
    /// Publicly resolvable URL of the stored binary.
    pub url: String,
    /// Key into the media store, when the binary is managed by us.
    pub storage_path: Option<String>,
    pub tags: BTreeSet<ImageTag>,
    pub caption: Option<String>,
    pub alt_text: Option<String>,
}

impl ProjectImage {
    #[allow(dead_code)]
    pub fn new(id: i64, url: impl Into<String>) -> Self {
        Self {
            id,
            url: url.into(),
            storage_path: None,
            tags: BTreeSet::new(),
            caption: None,
            alt_text: None,
        }
    }
}

/// A labeled before/after association between two images.
///
/// Either side may be unset while the pair is being assembled or after
/// a referenced image was deleted; a persisted pair should have both
/// sides set to distinct images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePair {
    pub id: i64,
    pub label: String,
    pub before_image_id: Option<i64>,
    pub after_image_id: Option<i64>,
}

/// Which side of a pair an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairSide {
    Before,
    After,
}

/// Recoverable rule violations in the editing model.
///
/// These surface to the admin as disabled or rejected actions, never as
/// hard failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MediaError {
    #[error("no image with id {0} in the collection")]
    UnknownImage(i64),
    #[error("no pair with id {0}")]
    UnknownPair(i64),
    #[error("hero image {0} is not part of the collection")]
    UnknownHero(i64),
    #[error("image {0} appears more than once")]
    DuplicateImage(i64),
    #[error("image {0} is tagged both before and after")]
    ConflictingTags(i64),
    #[error("a pair needs two different images")]
    IdenticalPairSides,
    #[error("pair limit of {0} reached")]
    PairLimitReached(usize),
    #[error("index {index} is out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// A project's media collections as edited by the admin workflow.
///
/// Ordering is positional: the order of `images` and `pairs` is the
/// display order and is what gets persisted.
#[derive(Debug, Clone)]
pub struct MediaSet {
    images: Vec<ProjectImage>,
    pairs: Vec<ImagePair>,
    hero_image_id: Option<i64>,
    max_pairs: usize,
    next_pair_id: i64,
}

impl MediaSet {
    pub fn new(max_pairs: usize) -> Self {
        Self {
            images: Vec::new(),
            pairs: Vec::new(),
            hero_image_id: None,
            max_pairs,
            next_pair_id: 1,
        }
    }

    /// Rebuild a set from stored collections. No validation happens
    /// here; callers holding untrusted input run `validate` before
    /// persisting.
    pub fn from_parts(
        images: Vec<ProjectImage>,
        pairs: Vec<ImagePair>,
        hero_image_id: Option<i64>,
        max_pairs: usize,
    ) -> Self {
        let next_pair_id = pairs.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        Self {
            images,
            pairs,
            hero_image_id,
            max_pairs,
            next_pair_id,
        }
    }

    pub fn images(&self) -> &[ProjectImage] {
        &self.images
    }

    pub fn pairs(&self) -> &[ImagePair] {
        &self.pairs
    }

    pub fn hero_image_id(&self) -> Option<i64> {
        self.hero_image_id
    }

    fn image_mut(&mut self, image_id: i64) -> Result<&mut ProjectImage, MediaError> {
        self.images
            .iter_mut()
            .find(|i| i.id == image_id)
            .ok_or(MediaError::UnknownImage(image_id))
    }

    fn pair_mut(&mut self, pair_id: i64) -> Result<&mut ImagePair, MediaError> {
        self.pairs
            .iter_mut()
            .find(|p| p.id == pair_id)
            .ok_or(MediaError::UnknownPair(pair_id))
    }

    fn contains_image(&self, image_id: i64) -> bool {
        self.images.iter().any(|i| i.id == image_id)
    }

    /// Add an already-persisted image to the end of the collection.
    #[allow(dead_code)]
    pub fn push_image(&mut self, image: ProjectImage) -> Result<(), MediaError> {
        if self.contains_image(image.id) {
            return Err(MediaError::DuplicateImage(image.id));
        }
        self.images.push(image);
        Ok(())
    }

    /// Toggle a category tag on an image and return its new tag set.
    ///
    /// Adding `before` removes `after` from the same image and vice
    /// versa; `gallery` coexists with either.
    pub fn toggle_tag(
        &mut self,
        image_id: i64,
        tag: ImageTag,
    ) -> Result<&BTreeSet<ImageTag>, MediaError> {
        let idx = self
            .images
            .iter()
            .position(|i| i.id == image_id)
            .ok_or(MediaError::UnknownImage(image_id))?;
        let image = &mut self.images[idx];
        if !image.tags.remove(&tag) {
            if let Some(other) = tag.counterpart() {
                image.tags.remove(&other);
            }
            image.tags.insert(tag);
        }
        Ok(&self.images[idx].tags)
    }

    /// Update caption and alt text on an image.
    pub fn set_image_text(
        &mut self,
        image_id: i64,
        caption: Option<String>,
        alt_text: Option<String>,
    ) -> Result<(), MediaError> {
        let image = self.image_mut(image_id)?;
        image.caption = caption;
        image.alt_text = alt_text;
        Ok(())
    }

    /// Designate one image as the project hero, or clear it with `None`.
    ///
    /// The hero must belong to this collection; the stored pointer is a
    /// foreign key, so an outside id could never persist anyway.
    pub fn set_hero(&mut self, image_id: Option<i64>) -> Result<(), MediaError> {
        if let Some(id) = image_id {
            if !self.contains_image(id) {
                return Err(MediaError::UnknownHero(id));
            }
        }
        self.hero_image_id = image_id;
        Ok(())
    }

    /// Create a before/after pair from two distinct images.
    ///
    /// Rejected (not fatal) when the collection is at its configured
    /// maximum, when both sides name the same image, or when either id
    /// is not in the collection.
    pub fn create_pair(
        &mut self,
        before_image_id: i64,
        after_image_id: i64,
    ) -> Result<&ImagePair, MediaError> {
        if self.pairs.len() >= self.max_pairs {
            return Err(MediaError::PairLimitReached(self.max_pairs));
        }
        if before_image_id == after_image_id {
            return Err(MediaError::IdenticalPairSides);
        }
        for id in [before_image_id, after_image_id] {
            if !self.contains_image(id) {
                return Err(MediaError::UnknownImage(id));
            }
        }
        let pair = ImagePair {
            id: self.next_pair_id,
            label: format!("Before & After {}", self.pairs.len() + 1),
            before_image_id: Some(before_image_id),
            after_image_id: Some(after_image_id),
        };
        self.next_pair_id += 1;
        self.pairs.push(pair);
        Ok(&self.pairs[self.pairs.len() - 1])
    }

    /// Give a pair a custom label. Custom labels survive until the next
    /// structural change to the pair collection, which renumbers all of
    /// them.
    pub fn relabel_pair(&mut self, pair_id: i64, label: impl Into<String>) -> Result<(), MediaError> {
        self.pair_mut(pair_id)?.label = label.into();
        Ok(())
    }

    /// Fill in (or replace) one side of an existing pair, e.g. after the
    /// previous image on that side was deleted.
    pub fn assign_pair_side(
        &mut self,
        pair_id: i64,
        side: PairSide,
        image_id: i64,
    ) -> Result<(), MediaError> {
        if !self.contains_image(image_id) {
            return Err(MediaError::UnknownImage(image_id));
        }
        let pair = self.pair_mut(pair_id)?;
        let other = match side {
            PairSide::Before => pair.after_image_id,
            PairSide::After => pair.before_image_id,
        };
        if other == Some(image_id) {
            return Err(MediaError::IdenticalPairSides);
        }
        match side {
            PairSide::Before => pair.before_image_id = Some(image_id),
            PairSide::After => pair.after_image_id = Some(image_id),
        }
        Ok(())
    }

    /// Delete a pair outright. The remaining pairs are renumbered.
    pub fn delete_pair(&mut self, pair_id: i64) -> Result<ImagePair, MediaError> {
        let idx = self
            .pairs
            .iter()
            .position(|p| p.id == pair_id)
            .ok_or(MediaError::UnknownPair(pair_id))?;
        let removed = self.pairs.remove(idx);
        self.renumber_pairs();
        Ok(removed)
    }

    /// Move an image to a new position, keeping all other relative
    /// orderings (stable move, not a swap).
    pub fn reorder_images(&mut self, from: usize, to: usize) -> Result<(), MediaError> {
        stable_move(&mut self.images, from, to)
    }

    /// Move a pair to a new position, then renumber every label.
    pub fn reorder_pairs(&mut self, from: usize, to: usize) -> Result<(), MediaError> {
        stable_move(&mut self.pairs, from, to)?;
        self.renumber_pairs();
        Ok(())
    }

    /// Regenerate every pair label from its 1-based position. Full pass,
    /// not an incremental patch, so labels stay contiguous after
    /// drag-and-drop reordering.
    fn renumber_pairs(&mut self) {
        for (idx, pair) in self.pairs.iter_mut().enumerate() {
            pair.label = format!("Before & After {}", idx + 1);
        }
    }

    /// Remove an image from the collection.
    ///
    /// Every pair referencing it keeps its other side and gets the
    /// matching side unset; the hero is cleared if it pointed here. Pair
    /// order does not change, so labels are left alone.
    pub fn remove_image(&mut self, image_id: i64) -> Result<ProjectImage, MediaError> {
        let idx = self
            .images
            .iter()
            .position(|i| i.id == image_id)
            .ok_or(MediaError::UnknownImage(image_id))?;
        let removed = self.images.remove(idx);
        for pair in &mut self.pairs {
            if pair.before_image_id == Some(image_id) {
                pair.before_image_id = None;
            }
            if pair.after_image_id == Some(image_id) {
                pair.after_image_id = None;
            }
        }
        if self.hero_image_id == Some(image_id) {
            self.hero_image_id = None;
        }
        Ok(removed)
    }

    /// Re-derive every invariant over the whole set. Run against any
    /// externally supplied collections before persisting them.
    pub fn validate(&self) -> Result<(), MediaError> {
        let mut seen = BTreeSet::new();
        for image in &self.images {
            if !seen.insert(image.id) {
                return Err(MediaError::DuplicateImage(image.id));
            }
            if image.tags.contains(&ImageTag::Before) && image.tags.contains(&ImageTag::After) {
                return Err(MediaError::ConflictingTags(image.id));
            }
        }
        if self.pairs.len() > self.max_pairs {
            return Err(MediaError::PairLimitReached(self.max_pairs));
        }
        for pair in &self.pairs {
            for id in [pair.before_image_id, pair.after_image_id].into_iter().flatten() {
                if !seen.contains(&id) {
                    return Err(MediaError::UnknownImage(id));
                }
            }
            if pair.before_image_id.is_some() && pair.before_image_id == pair.after_image_id {
                return Err(MediaError::IdenticalPairSides);
            }
        }
        if let Some(hero) = self.hero_image_id {
            if !seen.contains(&hero) {
                return Err(MediaError::UnknownHero(hero));
            }
        }
        Ok(())
    }
}

fn stable_move<T>(items: &mut Vec<T>, from: usize, to: usize) -> Result<(), MediaError> {
    let len = items.len();
    if from >= len || to >= len {
        return Err(MediaError::IndexOutOfRange { index: from.max(to), len });
    }
    let item = items.remove(from);
    items.insert(to, item);
    Ok(())
}

/// Persist an edited set. The database layer re-validates the whole
/// set and writes it in one transaction.
pub fn save(db: &Database, project_id: i64, set: &MediaSet) -> anyhow::Result<()> {
    db.save_project_media(project_id, set)
}

/// Load a project's media collections for editing.
pub fn load(db: &Database, project_id: i64, max_pairs: usize) -> anyhow::Result<MediaSet> {
    let (images, pairs, hero) = db.get_project_media(project_id)?;
    Ok(MediaSet::from_parts(images, pairs, hero, max_pairs))
}

/// Delete an image: best-effort removal of the stored object, then the
/// catalog row. Foreign keys clear any pair side and hero pointer that
/// referenced it. A failed object deletion is logged and leaves an
/// orphan for the next sweep; the catalog removal proceeds regardless.
pub fn delete_image(db: &Database, store: &MediaStore, image_id: i64) -> anyhow::Result<()> {
    let image = db
        .get_project_image(image_id)?
        .ok_or_else(|| anyhow::anyhow!("no image with id {}", image_id))?;
    if let Some(path) = &image.storage_path {
        if let Err(e) = store.delete(path) {
            warn!("Failed to delete stored object {}: {}", path, e);
        }
    }
    db.delete_project_image(image_id)?;
    Ok(())
}

/// Listing counterpart of [`delete_image`]: the same best-effort object
/// deletion, then the catalog row. Listings have no pairs or hero to
/// clean up.
pub fn delete_listing_image(
    db: &Database,
    store: &MediaStore,
    image_id: i64,
) -> anyhow::Result<()> {
    let image = db
        .get_listing_image(image_id)?
        .ok_or_else(|| anyhow::anyhow!("no listing image with id {}", image_id))?;
    if let Some(path) = &image.storage_path {
        if let Err(e) = store.delete(path) {
            warn!("Failed to delete stored object {}: {}", path, e);
        }
    }
    db.delete_listing_image(image_id)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_with_images(ids: &[i64]) -> MediaSet {
        let mut set = MediaSet::new(DEFAULT_MAX_PAIRS);
        for &id in ids {
            set.push_image(ProjectImage::new(id, format!("https://cdn.test/img/{}.jpg", id)))
                .unwrap();
        }
        set
    }

    fn tags(set: &MediaSet, image_id: i64) -> BTreeSet<ImageTag> {
        set.images()
            .iter()
            .find(|i| i.id == image_id)
            .unwrap()
            .tags
            .clone()
    }

    #[test]
    fn test_toggle_tag_adds_and_removes() {
        let mut set = set_with_images(&[1]);
        set.toggle_tag(1, ImageTag::Gallery).unwrap();
        assert!(tags(&set, 1).contains(&ImageTag::Gallery));
        set.toggle_tag(1, ImageTag::Gallery).unwrap();
        assert!(tags(&set, 1).is_empty());
    }

    #[test]
    fn test_before_and_after_are_exclusive() {
        let mut set = set_with_images(&[1]);
        set.toggle_tag(1, ImageTag::Before).unwrap();
        set.toggle_tag(1, ImageTag::After).unwrap();
        let t = tags(&set, 1);
        assert!(t.contains(&ImageTag::After));
        assert!(!t.contains(&ImageTag::Before));

        set.toggle_tag(1, ImageTag::Before).unwrap();
        let t = tags(&set, 1);
        assert!(t.contains(&ImageTag::Before));
        assert!(!t.contains(&ImageTag::After));
    }

    #[test]
    fn test_toggle_after_on_before_gallery_image() {
        // From ["before", "gallery"], toggling "after" yields
        // ["gallery", "after"].
        let mut set = set_with_images(&[1]);
        set.toggle_tag(1, ImageTag::Before).unwrap();
        set.toggle_tag(1, ImageTag::Gallery).unwrap();
        let new_tags = set.toggle_tag(1, ImageTag::After).unwrap().clone();
        let expected: BTreeSet<ImageTag> =
            [ImageTag::Gallery, ImageTag::After].into_iter().collect();
        assert_eq!(new_tags, expected);
    }

    #[test]
    fn test_no_toggle_order_produces_conflicting_tags() {
        let mut set = set_with_images(&[1]);
        let sequence = [
            ImageTag::Before,
            ImageTag::After,
            ImageTag::Gallery,
            ImageTag::Before,
            ImageTag::Before,
            ImageTag::After,
            ImageTag::Before,
        ];
        for tag in sequence {
            let t = set.toggle_tag(1, tag).unwrap();
            assert!(
                !(t.contains(&ImageTag::Before) && t.contains(&ImageTag::After)),
                "conflicting tags after toggling {:?}",
                tag
            );
        }
    }

    #[test]
    fn test_toggle_tag_unknown_image() {
        let mut set = set_with_images(&[1]);
        assert_eq!(
            set.toggle_tag(7, ImageTag::Gallery),
            Err(MediaError::UnknownImage(7))
        );
    }

    #[test]
    fn test_create_pair() {
        let mut set = set_with_images(&[1, 2]);
        set.toggle_tag(1, ImageTag::Before).unwrap();
        set.toggle_tag(2, ImageTag::After).unwrap();

        let pair = set.create_pair(1, 2).unwrap();
        assert_eq!(pair.label, "Before & After 1");
        assert_eq!(pair.before_image_id, Some(1));
        assert_eq!(pair.after_image_id, Some(2));
        assert_eq!(set.pairs().len(), 1);
    }

    #[test]
    fn test_create_pair_rejects_identical_sides() {
        let mut set = set_with_images(&[1, 2]);
        assert_eq!(set.create_pair(1, 1), Err(MediaError::IdenticalPairSides));
        assert!(set.pairs().is_empty());
    }

    #[test]
    fn test_create_pair_rejects_unknown_image() {
        let mut set = set_with_images(&[1]);
        assert_eq!(set.create_pair(1, 9), Err(MediaError::UnknownImage(9)));
    }

    #[test]
    fn test_pair_limit() {
        let ids: Vec<i64> = (1..=20).collect();
        let mut set = set_with_images(&ids);
        for i in 0..8 {
            set.create_pair(ids[i * 2], ids[i * 2 + 1]).unwrap();
        }
        assert_eq!(set.pairs().len(), 8);
        assert_eq!(set.create_pair(17, 18), Err(MediaError::PairLimitReached(8)));
        assert_eq!(set.pairs().len(), 8);
    }

    #[test]
    fn test_reorder_pairs_renumbers_all_labels() {
        let mut set = set_with_images(&[1, 2, 3, 4, 5, 6]);
        set.create_pair(1, 2).unwrap();
        set.create_pair(3, 4).unwrap();
        set.create_pair(5, 6).unwrap();
        set.relabel_pair(set.pairs()[0].id, "Kitchen transformation")
            .unwrap();

        set.reorder_pairs(2, 0).unwrap();

        let labels: Vec<&str> = set.pairs().iter().map(|p| p.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Before & After 1", "Before & After 2", "Before & After 3"]
        );
        // The moved pair now leads, with its references intact.
        assert_eq!(set.pairs()[0].before_image_id, Some(5));
        assert_eq!(set.pairs()[1].before_image_id, Some(1));
    }

    #[test]
    fn test_reorder_images_is_a_stable_move() {
        let mut set = set_with_images(&[1, 2, 3, 4, 5]);
        set.reorder_images(0, 3).unwrap();
        let order: Vec<i64> = set.images().iter().map(|i| i.id).collect();
        assert_eq!(order, vec![2, 3, 4, 1, 5]);

        set.reorder_images(3, 1).unwrap();
        let order: Vec<i64> = set.images().iter().map(|i| i.id).collect();
        assert_eq!(order, vec![2, 1, 3, 4, 5]);
    }

    #[test]
    fn test_reorder_out_of_range() {
        let mut set = set_with_images(&[1, 2]);
        assert_eq!(
            set.reorder_images(0, 2),
            Err(MediaError::IndexOutOfRange { index: 2, len: 2 })
        );
    }

    #[test]
    fn test_remove_image_clears_matching_pair_side() {
        let mut set = set_with_images(&[1, 2, 3, 4]);
        set.create_pair(1, 2).unwrap();
        set.create_pair(3, 4).unwrap();

        set.remove_image(1).unwrap();

        assert_eq!(set.images().len(), 3);
        let pair = &set.pairs()[0];
        assert_eq!(pair.before_image_id, None);
        assert_eq!(pair.after_image_id, Some(2));
        // Pair order is unchanged, so labels are too.
        assert_eq!(pair.label, "Before & After 1");
        assert_eq!(set.pairs()[1].label, "Before & After 2");
    }

    #[test]
    fn test_remove_image_clears_hero() {
        let mut set = set_with_images(&[1, 2]);
        set.set_hero(Some(1)).unwrap();
        set.remove_image(1).unwrap();
        assert_eq!(set.hero_image_id(), None);
    }

    #[test]
    fn test_delete_pair_renumbers_remaining() {
        let mut set = set_with_images(&[1, 2, 3, 4]);
        set.create_pair(1, 2).unwrap();
        set.create_pair(3, 4).unwrap();
        let first = set.pairs()[0].id;

        set.delete_pair(first).unwrap();

        assert_eq!(set.pairs().len(), 1);
        assert_eq!(set.pairs()[0].label, "Before & After 1");
        assert_eq!(set.pairs()[0].before_image_id, Some(3));
    }

    #[test]
    fn test_assign_pair_side() {
        let mut set = set_with_images(&[1, 2, 3]);
        set.create_pair(1, 2).unwrap();
        let pair_id = set.pairs()[0].id;
        set.remove_image(1).unwrap();

        set.assign_pair_side(pair_id, PairSide::Before, 3).unwrap();
        assert_eq!(set.pairs()[0].before_image_id, Some(3));

        assert_eq!(
            set.assign_pair_side(pair_id, PairSide::Before, 2),
            Err(MediaError::IdenticalPairSides)
        );
    }

    #[test]
    fn test_set_hero() {
        let mut set = set_with_images(&[1, 2]);
        set.set_hero(Some(1)).unwrap();
        assert_eq!(set.hero_image_id(), Some(1));
        // Single-select: re-invoking replaces the prior value.
        set.set_hero(Some(2)).unwrap();
        assert_eq!(set.hero_image_id(), Some(2));
        set.set_hero(None).unwrap();
        assert_eq!(set.hero_image_id(), None);

        assert_eq!(set.set_hero(Some(9)), Err(MediaError::UnknownHero(9)));
    }

    #[test]
    fn test_validate_accepts_partial_pairs() {
        let mut set = set_with_images(&[1, 2]);
        set.create_pair(1, 2).unwrap();
        set.remove_image(1).unwrap();
        assert_eq!(set.validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_submitted_inconsistencies() {
        // Collections as an untrusted caller might submit them.
        let image = |id: i64, t: &[ImageTag]| {
            let mut img = ProjectImage::new(id, format!("https://cdn.test/{}.jpg", id));
            img.tags = t.iter().copied().collect();
            img
        };

        let conflicting = MediaSet::from_parts(
            vec![image(1, &[ImageTag::Before, ImageTag::After])],
            Vec::new(),
            None,
            DEFAULT_MAX_PAIRS,
        );
        assert_eq!(conflicting.validate(), Err(MediaError::ConflictingTags(1)));

        let duplicate = MediaSet::from_parts(
            vec![image(1, &[]), image(1, &[])],
            Vec::new(),
            None,
            DEFAULT_MAX_PAIRS,
        );
        assert_eq!(duplicate.validate(), Err(MediaError::DuplicateImage(1)));

        let dangling = MediaSet::from_parts(
            vec![image(1, &[])],
            vec![ImagePair {
                id: 1,
                label: "Before & After 1".to_string(),
                before_image_id: Some(1),
                after_image_id: Some(9),
            }],
            None,
            DEFAULT_MAX_PAIRS,
        );
        assert_eq!(dangling.validate(), Err(MediaError::UnknownImage(9)));

        let twisted = MediaSet::from_parts(
            vec![image(1, &[])],
            vec![ImagePair {
                id: 1,
                label: "Before & After 1".to_string(),
                before_image_id: Some(1),
                after_image_id: Some(1),
            }],
            None,
            DEFAULT_MAX_PAIRS,
        );
        assert_eq!(twisted.validate(), Err(MediaError::IdenticalPairSides));

        let outside_hero = MediaSet::from_parts(
            vec![image(1, &[])],
            Vec::new(),
            Some(5),
            DEFAULT_MAX_PAIRS,
        );
        assert_eq!(outside_hero.validate(), Err(MediaError::UnknownHero(5)));

        let overfull = MediaSet::from_parts(
            (1..=4).map(|id| image(id, &[])).collect(),
            (0..3)
                .map(|i| ImagePair {
                    id: i + 1,
                    label: format!("Before & After {}", i + 1),
                    before_image_id: Some(1),
                    after_image_id: Some(2),
                })
                .collect(),
            None,
            2,
        );
        assert_eq!(overfull.validate(), Err(MediaError::PairLimitReached(2)));
    }

    #[test]
    fn test_tag_round_trip_strings() {
        for tag in [ImageTag::Before, ImageTag::After, ImageTag::Gallery] {
            assert_eq!(ImageTag::from_str(tag.as_str()), Some(tag));
        }
        assert_eq!(ImageTag::from_str("hero"), None);
    }
}
