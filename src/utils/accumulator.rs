//! Tool-call argument accumulator
//!
//! Vendors deliver tool-call arguments either as one atomic JSON blob or
//! as an arbitrarily chunked string that is only valid JSON once complete.
//! They also disagree on how fragments are addressed: some key them by a
//! stable call id, others only by positional index within the response.
//!
//! [`ToolCallAccumulator`] is one arena that accepts either key and
//! resolves it to the same internal slot. Fragments are concatenated in
//! arrival order and never parsed until the call closes. Calls left open
//! when the stream ends are simply dropped - a partial tool call is not
//! usable output.
//!
//! Each in-flight stream owns exactly one accumulator; it never outlives
//! the stream and is never shared across concurrent streams.

/// Key addressing a partial tool call, by whichever handle the vendor
/// supplies for the fragment.
#[derive(Debug, Clone, Copy)]
pub enum ToolCallKey<'a> {
    /// Stable call id (e.g. `toolu_…`, `call_…`)
    Id(&'a str),
    /// Positional index within the response
    Index(usize),
}

/// A fully closed tool call with its reassembled argument text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedToolCall {
    pub id: String,
    pub name: String,
    pub index: Option<usize>,
    /// Concatenation of every appended fragment, in arrival order
    pub arguments: String,
}

#[derive(Debug)]
struct Slot {
    id: String,
    name: String,
    index: Option<usize>,
    arguments: String,
}

/// Stateful buffer reassembling fragmented tool-call arguments
#[derive(Debug, Default)]
pub struct ToolCallAccumulator {
    slots: Vec<Slot>,
}

impl ToolCallAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a call. An index may refer back to this slot in later frames
    /// even when the vendor stops repeating the id.
    ///
    /// Reopening an already-known id updates its name/index instead of
    /// creating a second slot (some vendors repeat the opening fragment).
    pub fn open(&mut self, id: impl Into<String>, name: impl Into<String>, index: Option<usize>) {
        let id = id.into();
        let name = name.into();
        if let Some(slot) = self.slots.iter_mut().find(|s| s.id == id) {
            if !name.is_empty() {
                slot.name = name;
            }
            if index.is_some() {
                slot.index = index;
            }
            return;
        }
        self.slots.push(Slot {
            id,
            name,
            index,
            arguments: String::new(),
        });
    }

    /// Append an argument fragment to the call addressed by `key`.
    ///
    /// Returns false when no matching call is open; the fragment is
    /// discarded in that case (the caller decides whether that is worth a
    /// warning).
    pub fn append(&mut self, key: ToolCallKey<'_>, fragment: &str) -> bool {
        match self.slot_mut(key) {
            Some(slot) => {
                slot.arguments.push_str(fragment);
                true
            }
            None => false,
        }
    }

    /// Look up the id of the call addressed by `key`, if open.
    pub fn id_for(&self, key: ToolCallKey<'_>) -> Option<&str> {
        self.slot(key).map(|s| s.id.as_str())
    }

    /// Close the call addressed by `key`, returning its reassembled form.
    pub fn close(&mut self, key: ToolCallKey<'_>) -> Option<CompletedToolCall> {
        let pos = match key {
            ToolCallKey::Id(id) => self.slots.iter().position(|s| s.id == id),
            ToolCallKey::Index(index) => self.slots.iter().position(|s| s.index == Some(index)),
        }?;
        let slot = self.slots.remove(pos);
        Some(CompletedToolCall {
            id: slot.id,
            name: slot.name,
            index: slot.index,
            arguments: slot.arguments,
        })
    }

    /// Close every open call, ordered by index (insertion order for calls
    /// without one). Used by vendors whose close signal is the terminal
    /// frame rather than a per-call event.
    pub fn close_all(&mut self) -> Vec<CompletedToolCall> {
        let mut completed: Vec<CompletedToolCall> = self
            .slots
            .drain(..)
            .map(|slot| CompletedToolCall {
                id: slot.id,
                name: slot.name,
                index: slot.index,
                arguments: slot.arguments,
            })
            .collect();
        completed.sort_by_key(|c| c.index.unwrap_or(usize::MAX));
        completed
    }

    /// Number of calls currently open
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no calls are open
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn slot(&self, key: ToolCallKey<'_>) -> Option<&Slot> {
        match key {
            ToolCallKey::Id(id) => self.slots.iter().find(|s| s.id == id),
            ToolCallKey::Index(index) => self.slots.iter().find(|s| s.index == Some(index)),
        }
    }

    fn slot_mut(&mut self, key: ToolCallKey<'_>) -> Option<&mut Slot> {
        match key {
            ToolCallKey::Id(id) => self.slots.iter_mut().find(|s| s.id == id),
            ToolCallKey::Index(index) => self.slots.iter_mut().find(|s| s.index == Some(index)),
        }
    }
}
