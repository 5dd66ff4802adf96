//! Page-level grouping of index records.
//!
//! Records never reference each other; a section belongs to a page only
//! because both share the location path in front of the `#`.

use crate::location::Location;
use index_parser::IndexRecord;
use std::collections::HashMap;

/// All records that share one location path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOutline<'a> {
    /// Location path without anchor. Empty for the site root.
    pub path: &'a str,
    /// Page title taken from the first record seen for this path.
    pub page: &'a str,
    /// Records carrying an in-page anchor, in stored order.
    pub sections: Vec<&'a IndexRecord>,
    /// Records without an anchor, in stored order.
    pub body: Vec<&'a IndexRecord>,
}

impl<'a> PageOutline<'a> {
    fn new(path: &'a str, page: &'a str) -> Self {
        Self {
            path,
            page,
            sections: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Total records grouped under this page.
    pub fn len(&self) -> usize {
        self.sections.len() + self.body.len()
    }

    /// True when no record was grouped here. Never the case for outlines built by [`outline`].
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Section titles in stored order.
    pub fn section_titles(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.sections.iter().map(|&record| record.title.as_str())
    }
}

/// Groups records by location path, in order of each path's first appearance.
pub fn outline<'a, I>(records: I) -> Vec<PageOutline<'a>>
where
    I: IntoIterator<Item = &'a IndexRecord>,
{
    let mut pages: Vec<PageOutline<'a>> = Vec::new();
    let mut by_path: HashMap<&'a str, usize> = HashMap::new();

    for record in records {
        let location = Location::parse(&record.location);
        let slot = *by_path.entry(location.path()).or_insert_with(|| {
            pages.push(PageOutline::new(location.path(), &record.page));
            pages.len() - 1
        });
        let page = &mut pages[slot];
        if location.anchor().is_some() {
            page.sections.push(record);
        } else {
            page.body.push(record);
        }
    }

    pages
}
