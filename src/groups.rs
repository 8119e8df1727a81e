use anyhow::{bail, Context, Result};
use regex::Regex;

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

#[derive(Debug)]
struct Group {
    name: String,
    regex: Regex,
}

/// Product groups: named regular expressions that fold product variants
/// together, so that (for example) every edition of a book sells as one item.
#[derive(Debug, Default)]
pub struct Groups(Vec<Group>);

impl Groups {
    /// Loads groups from the file at `path`.
    ///
    /// Each non-blank line names a group and gives the pattern its products
    /// match, separated by ` | `:
    ///
    /// ```txt
    /// Widget | ^Widget
    /// ```
    ///
    /// Both sides are trimmed. Groups are tried in file order, and a product
    /// takes the name of the first group whose [`regex::Regex`] matches it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be opened or read, a line has no
    /// ` | ` separator, or a pattern is not a valid regular expression.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut groups = Self::default();
        let file = BufReader::new(
            File::open(path).with_context(|| format!("opening {}", path.display()))?,
        );
        for line in file.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let Some((name, regex_str)) = line.split_once(" | ") else {
                bail!("reading {path:?}: bad line format (missing |): {line}");
            };
            groups
                .add_group(name.trim(), regex_str.trim())
                .with_context(|| format!("reading {path:?}"))?;
        }
        Ok(groups)
    }

    /// Adds a new group.
    ///
    /// Products whose name matches `regex_str` will be counted as part of
    /// product group `name`, rather than under their own names.
    ///
    /// # Errors
    ///
    /// Returns any errors from compiling `regex_str` with [`Regex::new`].
    pub fn add_group(&mut self, name: &str, regex_str: &str) -> Result<()> {
        self.0.push(Group {
            name: name.to_string(),
            regex: Regex::new(regex_str)?,
        });
        Ok(())
    }

    /// Returns the name of the first group matching `product`, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// # use monthly_sales::Groups;
    /// let mut groups = Groups::default();
    /// groups.add_group("Foo", "foo").unwrap();
    /// assert_eq!(groups.product_group("foo variant 1"), Some("Foo"));
    /// assert_eq!(groups.product_group("ungrouped product"), None);
    /// ```
    #[must_use]
    pub fn product_group(&self, product: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|g| g.regex.is_match(product))
            .map(|g| g.name.as_str())
    }

    /// Returns the name `product` should be counted under: its group's name,
    /// or the product name itself when no group matches.
    #[must_use]
    pub fn display_name<'a>(&'a self, product: &'a str) -> &'a str {
        self.product_group(product).unwrap_or(product)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
