// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Location Classifier
//!
//! Maps a free-text feature name to a location label by case-insensitive
//! keyword rules. Rules are tried in order and the first match wins.

/// One keyword rule: any keyword matching yields `label`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationRule {
    /// Lowercase keywords, matched as substrings
    pub keywords: Vec<String>,
    pub label: String,
}

impl LocationRule {
    pub fn new(keywords: &[&str], label: impl Into<String>) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            label: label.into(),
        }
    }

    #[inline]
    fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(k.as_str()))
    }
}

/// Result when no rule matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fallback {
    /// Return the feature name unchanged
    #[default]
    Identity,
    /// Return an empty location
    Empty,
}

/// Ordered keyword rule table plus a fallback policy
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LocationClassifier {
    rules: Vec<LocationRule>,
    fallback: Fallback,
}

impl LocationClassifier {
    /// Empty classifier with identity fallback
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule (builder style)
    pub fn rule(mut self, keywords: &[&str], label: impl Into<String>) -> Self {
        self.rules.push(LocationRule::new(keywords, label));
        self
    }

    pub fn with_fallback(mut self, fallback: Fallback) -> Self {
        self.fallback = fallback;
        self
    }

    /// Coarse location labels used for the table's Location column
    pub fn coarse() -> Self {
        Self::new()
            .rule(&["plane1"], "Plane1")
            .rule(&["plane2"], "Plane2")
            .rule(&["boss1"], "Boss1")
            .rule(&["top"], "top face")
            .rule(&["bottom"], "bottom face")
            .rule(&["cylindrical", "side"], "cylindrical side")
            .rule(&["hole"], "hole")
            .rule(&["slot"], "slot")
    }

    /// Verbose surface descriptions used for the table's Surface column
    pub fn surface() -> Self {
        Self::new()
            .rule(&["plane1", "top"], "top face")
            .rule(&["plane2", "bottom"], "bottom face")
            .rule(&["boss1", "cylindrical", "side"], "curved side of the cylinder")
            .rule(&["cone", "conical"], "conical side")
            .rule(&["face"], "planar face")
    }

    pub fn rules(&self) -> &[LocationRule] {
        &self.rules
    }

    pub fn fallback(&self) -> Fallback {
        self.fallback
    }

    /// Label of the first matching rule, if any
    pub fn matching_label(&self, name: &str) -> Option<&str> {
        let lowered = name.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map(|rule| rule.label.as_str())
    }

    /// Classify a feature name
    pub fn classify<'n>(&'n self, name: &'n str) -> &'n str {
        match self.matching_label(name) {
            Some(label) => label,
            None => match self.fallback {
                Fallback::Identity => name,
                Fallback::Empty => "",
            },
        }
    }
}
