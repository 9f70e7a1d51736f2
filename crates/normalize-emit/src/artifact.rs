//! Rendered output tree.
//!
//! An [`Artifact`] is a nested, ordered mapping of names to directories or
//! text leaves. Materialising it (filesystem, archive, memory) is left to
//! the caller; [`Artifact::leaves`] gives a flat walk for that purpose.

use indexmap::IndexMap;
use indexmap::map::Entry as MapEntry;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MediaType {
    Directory,
    ModuleDirectory,
    /// Source text; the payload is the MIME type (e.g. `text/x-go`).
    Source(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Leaf {
    pub media_type: MediaType,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Directory {
    pub media_type: MediaType,
    pub entries: IndexMap<String, Entry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Entry {
    Directory(Directory),
    Leaf(Leaf),
}

impl Entry {
    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Entry::Leaf(leaf) => Some(leaf),
            Entry::Directory(_) => None,
        }
    }

    pub fn as_directory(&self) -> Option<&Directory> {
        match self {
            Entry::Directory(dir) => Some(dir),
            Entry::Leaf(_) => None,
        }
    }
}

impl Directory {
    fn new(media_type: MediaType) -> Self {
        Self {
            media_type,
            entries: IndexMap::new(),
        }
    }
}

/// Result of one render call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub root: Directory,
}

/// Returned when a leaf would overwrite an existing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occupied(pub String);

impl Default for Artifact {
    fn default() -> Self {
        Self::new()
    }
}

impl Artifact {
    pub fn new() -> Self {
        Self {
            root: Directory::new(MediaType::Directory),
        }
    }

    /// Ensure a directory chain exists. The final segment takes
    /// `media_type`; missing intermediate segments are plain directories.
    pub fn ensure_dir(&mut self, segments: &[String], media_type: MediaType) -> Result<(), Occupied> {
        let mut dir = &mut self.root;
        for (i, segment) in segments.iter().enumerate() {
            let last = i + 1 == segments.len();
            let entry = dir
                .entries
                .entry(segment.clone())
                .or_insert_with(|| Entry::Directory(Directory::new(MediaType::Directory)));
            dir = match entry {
                Entry::Directory(d) => d,
                Entry::Leaf(_) => return Err(Occupied(segments[..=i].join("/"))),
            };
            if last && media_type != MediaType::Directory {
                dir.media_type = media_type.clone();
            }
        }
        Ok(())
    }

    /// Insert a leaf under `dir`; existing entries are never replaced.
    pub fn insert_leaf(&mut self, dir: &[String], name: &str, leaf: Leaf) -> Result<(), Occupied> {
        self.ensure_dir(dir, MediaType::Directory)?;
        let mut current = &mut self.root;
        for segment in dir {
            current = match current.entries.get_mut(segment) {
                Some(Entry::Directory(d)) => d,
                _ => return Err(Occupied(segment.clone())),
            };
        }
        match current.entries.entry(name.to_string()) {
            MapEntry::Occupied(_) => {
                let mut path = dir.to_vec();
                path.push(name.to_string());
                Err(Occupied(path.join("/")))
            }
            MapEntry::Vacant(slot) => {
                slot.insert(Entry::Leaf(leaf));
                Ok(())
            }
        }
    }

    /// Look up an entry by `/`-separated path.
    pub fn get(&self, path: &str) -> Option<&Entry> {
        let mut segments = path.split('/').filter(|s| !s.is_empty());
        let first = segments.next()?;
        let mut entry = self.root.entries.get(first)?;
        for segment in segments {
            entry = entry.as_directory()?.entries.get(segment)?;
        }
        Some(entry)
    }

    /// Content of the leaf at `path`.
    pub fn text(&self, path: &str) -> Option<&str> {
        self.get(path)?.as_leaf().map(|l| l.content.as_str())
    }

    /// All leaves with their full paths, depth-first in insertion order.
    pub fn leaves(&self) -> Vec<(String, &Leaf)> {
        fn walk<'a>(dir: &'a Directory, prefix: &str, out: &mut Vec<(String, &'a Leaf)>) {
            for (name, entry) in &dir.entries {
                let path = if prefix.is_empty() {
                    name.clone()
                } else {
                    format!("{}/{}", prefix, name)
                };
                match entry {
                    Entry::Leaf(leaf) => out.push((path, leaf)),
                    Entry::Directory(sub) => walk(sub, &path, out),
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.root, "", &mut out);
        out
    }
}
