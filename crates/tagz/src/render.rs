//! Serialization of tag trees.
//!
//! Every output mode is driven by one lazy walker, [`Fragments`], which
//! yields the smallest meaningful pieces of markup (an opening tag, a text
//! run, a closing tag). The other modes are adapters over it:
//!
//! - [`Render::to_html`]: all fragments joined into one string
//! - [`Lines`]: pretty output split into lines
//! - [`Chunks`]: output re-cut into pieces of at most `chunk_size` characters
//! - [`Render::write_to`]: fragments written to an [`io::Write`] sink
//!
//! Because they share the walker, joining the items of any mode gives the
//! buffered output for the same options.
//!
//! # Pretty layout
//!
//! In pretty mode every tag starts a new line indented by its depth. A tag
//! without children, or whose single child resolves to one line of text,
//! stays on one line (`<p>text</p>`). Otherwise the children go on their
//! own lines one level deeper, text is trimmed, blank text is dropped, and
//! the closing tag gets its own line. There is no trailing newline.
//!
//! # Laziness
//!
//! The walker keeps an explicit stack and reads the tree as it goes, so a
//! render reflects the tree at the moment each node is reached. No
//! `RefCell` borrow is held while a lazy child or attribute runs, so
//! callables may mutate the tree they belong to.

use std::collections::VecDeque;
use std::io;
use std::mem;

use crate::error::{Error, Location, Result};
use crate::escape::{escape_attr, escape_text};
use crate::fragment::Fragment;
use crate::tag::Tag;
use crate::value::{Child, Resolved, ResolvedAttr, resolve_attr, resolve_child};

/// Parent name reported for errors inside a fragment.
const FRAGMENT_PARENT: &str = "#fragment";

/// Serializer options.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RenderOptions {
    /// Indented multi-line output instead of dense single-line output.
    pub pretty: bool,
    /// Unit of indentation, repeated once per nesting level.
    pub indent: String,
    /// Fail with [`Error::CycleSuspected`] past this nesting depth.
    pub max_depth: Option<usize>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            indent: "\t".to_owned(),
            max_depth: None,
        }
    }
}

impl RenderOptions {
    /// Dense output, the default.
    #[must_use]
    pub fn dense() -> Self {
        Self::default()
    }

    /// Pretty output indented with tabs.
    #[must_use]
    pub fn pretty() -> Self {
        Self {
            pretty: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }
}

/// Something that can be serialized to HTML.
pub trait Render {
    /// Fragment iteration: the smallest pieces of markup, in order.
    fn iter_string(&self, options: &RenderOptions) -> Fragments;

    /// Buffered render.
    ///
    /// # Errors
    ///
    /// Returns the first error raised while resolving the tree.
    fn to_html(&self, options: &RenderOptions) -> Result<String> {
        let mut out = String::new();
        for fragment in self.iter_string(options) {
            out.push_str(&fragment?);
        }
        Ok(out)
    }

    /// Dense buffered render with default options.
    ///
    /// # Errors
    ///
    /// Returns the first error raised while resolving the tree.
    fn render(&self) -> Result<String> {
        self.to_html(&RenderOptions::default())
    }

    /// Line iteration. Always pretty; items carry no line terminator.
    fn iter_lines(&self, indent: &str) -> Lines {
        Lines::new(self.iter_string(&RenderOptions::pretty().with_indent(indent)))
    }

    /// Chunk iteration: pieces of at most `chunk_size` characters.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is 0.
    fn iter_chunk(&self, chunk_size: usize, options: &RenderOptions) -> Chunks {
        Chunks::new(self.iter_string(options), chunk_size)
    }

    /// Stream the markup into `writer`, fragment by fragment.
    ///
    /// Output written before an error is not rolled back.
    ///
    /// # Errors
    ///
    /// Returns resolution errors and I/O errors from `writer`.
    fn write_to(&self, writer: &mut dyn io::Write, options: &RenderOptions) -> Result<()> {
        let mut written = 0usize;
        for fragment in self.iter_string(options) {
            let fragment = fragment?;
            writer.write_all(fragment.as_bytes())?;
            written += fragment.len();
        }
        writer.flush()?;
        tracing::debug!(bytes = written, pretty = options.pretty, "Rendered to writer");
        Ok(())
    }
}

impl Render for Tag {
    fn iter_string(&self, options: &RenderOptions) -> Fragments {
        Fragments::new(Child::Tag(self.clone()), options)
    }
}

impl Render for Fragment {
    fn iter_string(&self, options: &RenderOptions) -> Fragments {
        Fragments::new(Child::Fragment(self.clone()), options)
    }
}

enum Frame {
    /// A child not yet resolved.
    Pending { child: Child, depth: usize },
    /// An open tag whose children are being written.
    Tag {
        tag: Tag,
        name: String,
        depth: usize,
        next: usize,
        raw: bool,
        block: bool,
    },
    /// A fragment whose children are being written at `depth`.
    Fragment {
        fragment: Fragment,
        depth: usize,
        next: usize,
        raw: bool,
    },
}

/// Lazy fragment iterator, the engine behind every output mode.
///
/// Yields `Err` at most once, then stops.
pub struct Fragments {
    stack: Vec<Frame>,
    queue: VecDeque<String>,
    pretty: bool,
    indent: String,
    max_depth: Option<usize>,
    started: bool,
    done: bool,
}

impl Fragments {
    pub(crate) fn new(root: Child, options: &RenderOptions) -> Self {
        tracing::debug!(root = %root_name(&root), pretty = options.pretty, "Starting render");
        Self {
            stack: vec![Frame::Pending {
                child: root,
                depth: 0,
            }],
            queue: VecDeque::new(),
            pretty: options.pretty,
            indent: options.indent.clone(),
            max_depth: options.max_depth,
            started: false,
            done: false,
        }
    }

    /// Emit `preamble` before the tree. It must end with a newline if the
    /// tree is to start on a new line.
    pub(crate) fn with_preamble(mut self, preamble: &str) -> Self {
        self.queue.push_back(preamble.to_owned());
        self
    }

    fn step(&mut self, frame: Frame) -> Result<()> {
        match frame {
            Frame::Pending { child, depth } => {
                let resolved = resolve_child(child, || Location::Child {
                    parent: "#root".to_owned(),
                    index: 0,
                })?;
                self.place(resolved, depth, false)
            }
            Frame::Tag {
                tag,
                name,
                depth,
                next,
                raw,
                block,
            } => {
                let Some(child) = tag.child_at(next) else {
                    let mut close = if block {
                        self.line_start(depth)
                    } else {
                        String::new()
                    };
                    close.push_str("</");
                    close.push_str(&name);
                    close.push('>');
                    self.queue.push_back(close);
                    return Ok(());
                };
                let resolved = resolve_child(child, || Location::Child {
                    parent: name.clone(),
                    index: next,
                });
                self.stack.push(Frame::Tag {
                    tag,
                    name,
                    depth,
                    next: next + 1,
                    raw,
                    block,
                });
                self.place(resolved?, depth + 1, raw)
            }
            Frame::Fragment {
                fragment,
                depth,
                next,
                raw,
            } => {
                let Some(child) = fragment.child_at(next) else {
                    return Ok(());
                };
                let resolved = resolve_child(child, || Location::Child {
                    parent: FRAGMENT_PARENT.to_owned(),
                    index: next,
                })?;
                self.stack.push(Frame::Fragment {
                    fragment,
                    depth,
                    next: next + 1,
                    raw,
                });
                self.place(resolved, depth, raw)
            }
        }
    }

    /// Write a resolved child whose own line (if any) sits at `depth`.
    fn place(&mut self, resolved: Resolved, depth: usize, raw: bool) -> Result<()> {
        match resolved {
            Resolved::Skip => Ok(()),
            Resolved::Text(text) => {
                self.text(&text, depth, raw);
                Ok(())
            }
            Resolved::Raw(text) => {
                self.text(&text, depth, true);
                Ok(())
            }
            Resolved::Tag(tag) => self.open(tag, depth),
            Resolved::Fragment(fragment) => {
                self.check_depth(FRAGMENT_PARENT)?;
                self.stack.push(Frame::Fragment {
                    fragment,
                    depth,
                    next: 0,
                    raw,
                });
                Ok(())
            }
        }
    }

    fn text(&mut self, text: &str, depth: usize, raw: bool) {
        if !self.pretty {
            if !text.is_empty() {
                self.queue.push_back(encode_text(text, raw));
            }
            return;
        }
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut out = self.line_start(depth);
            out.push_str(&encode_text(line, raw));
            self.queue.push_back(out);
        }
    }

    fn open(&mut self, tag: Tag, depth: usize) -> Result<()> {
        let open = tag.open_tag();
        self.check_depth(&open.name)?;

        let mut start = self.line_start(depth);
        start.push('<');
        start.push_str(&open.name);
        for (key, value) in open.attributes {
            match resolve_attr(value, &open.name, &key)? {
                ResolvedAttr::Bare => {
                    start.push(' ');
                    start.push_str(&key);
                }
                ResolvedAttr::Value(value) => {
                    start.push(' ');
                    start.push_str(&key);
                    start.push_str("=\"");
                    start.push_str(&escape_attr(&value));
                    start.push('"');
                }
                ResolvedAttr::Omit => {}
            }
        }

        // Attribute callables may have changed the children, so count now.
        let child_count = tag.len();
        if child_count == 0 {
            if tag.is_void() {
                start.push_str("/>");
                self.queue.push_back(start);
            } else {
                start.push('>');
                self.queue.push_back(start);
                self.queue.push_back(format!("</{}>", open.name));
            }
            return Ok(());
        }
        start.push('>');

        if self.pretty && child_count == 1 {
            return self.open_single(tag, open.name, start, depth, open.raw_content);
        }

        self.queue.push_back(start);
        self.stack.push(Frame::Tag {
            tag,
            name: open.name,
            depth,
            next: 0,
            raw: open.raw_content,
            block: self.pretty,
        });
        Ok(())
    }

    /// Pretty mode, exactly one child: resolve it now to decide between the
    /// one-line and the block layout. The child is not resolved again.
    fn open_single(
        &mut self,
        tag: Tag,
        name: String,
        start: String,
        depth: usize,
        raw: bool,
    ) -> Result<()> {
        let Some(child) = tag.child_at(0) else {
            self.queue.push_back(start);
            self.queue.push_back(format!("</{name}>"));
            return Ok(());
        };
        let resolved = resolve_child(child, || Location::Child {
            parent: name.clone(),
            index: 0,
        })?;

        let inline = match &resolved {
            Resolved::Skip => Some(String::new()),
            Resolved::Text(text) if !text.trim().contains('\n') => {
                Some(encode_text(text.trim(), raw))
            }
            Resolved::Raw(text) if !text.trim().contains('\n') => {
                Some(encode_text(text.trim(), true))
            }
            _ => None,
        };

        self.queue.push_back(start);
        if let Some(text) = inline {
            if !text.is_empty() {
                self.queue.push_back(text);
            }
            self.queue.push_back(format!("</{name}>"));
            return Ok(());
        }

        self.stack.push(Frame::Tag {
            tag,
            name,
            depth,
            next: 1,
            raw,
            block: true,
        });
        self.place(resolved, depth + 1, raw)
    }

    /// Line break and indentation for a new line at `depth`; empty in
    /// dense mode and before the first line.
    fn line_start(&mut self, depth: usize) -> String {
        if !self.pretty {
            return String::new();
        }
        let mut out = String::with_capacity(1 + self.indent.len() * depth);
        if mem::replace(&mut self.started, true) {
            out.push('\n');
        }
        for _ in 0..depth {
            out.push_str(&self.indent);
        }
        out
    }

    fn check_depth(&self, name: &str) -> Result<()> {
        match self.max_depth {
            Some(limit) if self.stack.len() >= limit => Err(Error::CycleSuspected {
                tag: name.to_owned(),
                limit,
            }),
            _ => Ok(()),
        }
    }
}

fn root_name(root: &Child) -> String {
    match root {
        Child::Tag(tag) => tag.name(),
        _ => FRAGMENT_PARENT.to_owned(),
    }
}

fn encode_text(text: &str, raw: bool) -> String {
    if raw {
        text.to_owned()
    } else {
        escape_text(text).into_owned()
    }
}

impl Iterator for Fragments {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(fragment) = self.queue.pop_front() {
                return Some(Ok(fragment));
            }
            if self.done {
                return None;
            }
            let Some(frame) = self.stack.pop() else {
                self.done = true;
                tracing::debug!("Render finished");
                return None;
            };
            if let Err(err) = self.step(frame) {
                self.stack.clear();
                self.queue.clear();
                self.done = true;
                return Some(Err(err));
            }
        }
    }
}

/// Line iterator over pretty output.
///
/// Joining the lines with `"\n"` gives the pretty buffered output.
pub struct Lines {
    inner: Fragments,
    current: String,
    ready: VecDeque<String>,
    produced: bool,
    done: bool,
}

impl Lines {
    fn new(inner: Fragments) -> Self {
        Self {
            inner,
            current: String::new(),
            ready: VecDeque::new(),
            produced: false,
            done: false,
        }
    }
}

impl Iterator for Lines {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(line) = self.ready.pop_front() {
                return Some(Ok(line));
            }
            if self.done {
                return None;
            }
            match self.inner.next() {
                Some(Ok(fragment)) => {
                    self.produced |= !fragment.is_empty();
                    let mut parts = fragment.split('\n');
                    if let Some(first) = parts.next() {
                        self.current.push_str(first);
                    }
                    for part in parts {
                        self.ready.push_back(mem::take(&mut self.current));
                        self.current.push_str(part);
                    }
                }
                Some(Err(err)) => {
                    self.done = true;
                    self.ready.clear();
                    self.current.clear();
                    return Some(Err(err));
                }
                None => {
                    self.done = true;
                    if self.produced {
                        return Some(Ok(mem::take(&mut self.current)));
                    }
                }
            }
        }
    }
}

/// Chunk iterator: the output cut into pieces of `chunk_size` characters.
///
/// Every chunk but the last has exactly `chunk_size` characters; none is
/// empty.
pub struct Chunks {
    inner: Fragments,
    chunk_size: usize,
    buffer: String,
    /// Byte offset of the first unconsumed character in `buffer`.
    start: usize,
    buffered_chars: usize,
    done: bool,
}

impl Chunks {
    fn new(inner: Fragments, chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk size must be non-zero");
        Self {
            inner,
            chunk_size,
            buffer: String::new(),
            start: 0,
            buffered_chars: 0,
            done: false,
        }
    }

    /// Take the next `chunk_size` characters. Consumed text is dropped
    /// from the buffer once it makes up more than half of it, so each byte
    /// is moved a bounded number of times.
    fn take_chunk(&mut self) -> String {
        let pending = &self.buffer[self.start..];
        let len = pending
            .char_indices()
            .nth(self.chunk_size)
            .map_or(pending.len(), |(index, _)| index);
        let chunk = pending[..len].to_owned();
        self.start += len;
        self.buffered_chars -= self.chunk_size;

        if self.start * 2 > self.buffer.len() {
            self.buffer.drain(..self.start);
            self.start = 0;
        }
        chunk
    }

    fn take_rest(&mut self) -> String {
        let rest = self.buffer.split_off(self.start);
        self.buffer.clear();
        self.start = 0;
        self.buffered_chars = 0;
        rest
    }
}

impl Iterator for Chunks {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                return None;
            }
            if self.buffered_chars >= self.chunk_size {
                return Some(Ok(self.take_chunk()));
            }
            match self.inner.next() {
                Some(Ok(fragment)) => {
                    self.buffered_chars += fragment.chars().count();
                    self.buffer.push_str(&fragment);
                }
                Some(Err(err)) => {
                    self.done = true;
                    self.buffer.clear();
                    self.start = 0;
                    return Some(Err(err));
                }
                None => {
                    self.done = true;
                    let rest = self.take_rest();
                    if !rest.is_empty() {
                        return Some(Ok(rest));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::value::{ABSENT, AttrValue, Raw};

    fn sample() -> Tag {
        Tag::new("p")
            .child("Hello, World!")
            .child(Tag::new("a").attr("href", "/").child("go to index").child(""))
            .child(Tag::new("i"))
    }

    fn all_modes_agree(tag: &Tag, options: &RenderOptions) {
        let buffered = tag.to_html(options).unwrap();

        let fragments: String = tag
            .iter_string(options)
            .collect::<Result<Vec<_>>>()
            .unwrap()
            .concat();
        assert_eq!(fragments, buffered);

        for size in [1, 2, 7, 50, 4096] {
            let chunks = tag
                .iter_chunk(size, options)
                .collect::<Result<Vec<_>>>()
                .unwrap();
            assert_eq!(chunks.concat(), buffered, "chunk size {size}");
            for chunk in &chunks[..chunks.len().saturating_sub(1)] {
                assert_eq!(chunk.chars().count(), size);
            }
        }

        if options.pretty {
            let lines = tag
                .iter_lines(&options.indent)
                .collect::<Result<Vec<_>>>()
                .unwrap();
            assert_eq!(lines.join("\n"), buffered);
        }
    }

    #[test]
    fn test_dense_render() {
        assert_eq!(
            sample().render().unwrap(),
            r#"<p>Hello, World!<a href="/">go to index</a><i></i></p>"#
        );
    }

    #[test]
    fn test_pretty_render() {
        assert_eq!(
            sample().to_html(&RenderOptions::pretty()).unwrap(),
            "<p>\n\tHello, World!\n\t<a href=\"/\">\n\t\tgo to index\n\t</a>\n\t<i></i>\n</p>"
        );
    }

    #[test]
    fn test_pretty_single_text_child_on_one_line() {
        let tag = Tag::new("ul")
            .child(Tag::new("li").child("  one  "))
            .child(Tag::new("li").child("two"));
        assert_eq!(
            tag.to_html(&RenderOptions::pretty().with_indent("  ")).unwrap(),
            "<ul>\n  <li>one</li>\n  <li>two</li>\n</ul>"
        );
    }

    #[test]
    fn test_pretty_multiline_text() {
        let tag = Tag::new("pre").child("first\n\n  second  \n");
        assert_eq!(
            tag.to_html(&RenderOptions::pretty()).unwrap(),
            "<pre>\n\tfirst\n\tsecond\n</pre>"
        );
    }

    #[test]
    fn test_void_element_self_closes() {
        let meta = Tag::new("meta").attr("charset", "utf-8");
        assert_eq!(meta.render().unwrap(), r#"<meta charset="utf-8"/>"#);
        assert_eq!(
            meta.to_html(&RenderOptions::pretty()).unwrap(),
            r#"<meta charset="utf-8"/>"#
        );
    }

    #[test]
    fn test_attributes_sorted() {
        let tag = Tag::new("a")
            .attr("href", "/x")
            .attr("data_id", 7)
            .class("nav")
            .attr("aria_label", "Go");
        assert_eq!(
            tag.render().unwrap(),
            r#"<a aria-label="Go" class="nav" data-id="7" href="/x"></a>"#
        );
    }

    #[test]
    fn test_boolean_attribute() {
        let input = Tag::new("input").attr("disabled", true);
        assert_eq!(input.render().unwrap(), "<input disabled/>");

        input.set_attribute("disabled", false).unwrap();
        assert_eq!(input.render().unwrap(), "<input/>");
    }

    #[test]
    fn test_attribute_values_escaped() {
        let tag = Tag::new("div").attr("foo", "<b>\"unsafe\"</b>");
        assert_eq!(
            tag.render().unwrap(),
            r#"<div foo="&lt;b&gt;&quot;unsafe&quot;&lt;/b&gt;"></div>"#
        );
    }

    #[test]
    fn test_text_escaped_except_raw_content() {
        let payload = "<script>alert('x')</script>";
        assert_eq!(
            Tag::new("div").child(payload).render().unwrap(),
            "<div>&lt;script&gt;alert(&#x27;x&#x27;)&lt;/script&gt;</div>"
        );
        assert_eq!(
            Tag::new("script").child(payload).render().unwrap(),
            format!("<script>{payload}</script>")
        );
        assert_eq!(
            Tag::new("style").child(payload).render().unwrap(),
            format!("<style>{payload}</style>")
        );
    }

    #[test]
    fn test_raw_content_not_inherited_by_nested_tags() {
        let tag = Tag::new("script").child(Tag::new("b").child("<x>"));
        assert_eq!(tag.render().unwrap(), "<script><b>&lt;x&gt;</b></script>");
    }

    #[test]
    fn test_raw_child_never_escaped() {
        let tag = Tag::new("div").child(Raw::new("<hr/>")).child("<");
        assert_eq!(tag.render().unwrap(), "<div><hr/>&lt;</div>");
    }

    #[test]
    fn test_lazy_child_resolved_each_render() {
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        let tag = Tag::new("div").child(Child::lazy(move || {
            counter.set(counter.get() + 1);
            format!("call {}", counter.get())
        }));

        assert_eq!(tag.render().unwrap(), "<div>call 1</div>");
        assert_eq!(count.get(), 1);
        assert_eq!(tag.render().unwrap(), "<div>call 2</div>");
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_lazy_single_child_resolved_once_in_pretty_mode() {
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        let tag = Tag::new("div").child(Child::lazy(move || {
            counter.set(counter.get() + 1);
            Tag::new("span").child("world")
        }));

        assert_eq!(
            tag.to_html(&RenderOptions::pretty()).unwrap(),
            "<div>\n\t<span>world</span>\n</div>"
        );
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_lazy_attribute_and_child() {
        let attr_calls = Rc::new(Cell::new(0));
        let child_calls = Rc::new(Cell::new(0));
        let (a, c) = (Rc::clone(&attr_calls), Rc::clone(&child_calls));

        let tag = Tag::new("div")
            .attr(
                "foo",
                AttrValue::lazy(move || {
                    a.set(a.get() + 1);
                    "attr\"val"
                }),
            )
            .child(Child::lazy(move || {
                c.set(c.get() + 1);
                "childval"
            }));

        assert_eq!(
            tag.render().unwrap(),
            r#"<div foo="attr&quot;val">childval</div>"#
        );
        assert_eq!(attr_calls.get(), 1);
        assert_eq!(child_calls.get(), 1);
    }

    #[test]
    fn test_absent_attribute_round_trip() {
        let present = Rc::new(Cell::new(true));
        let flag = Rc::clone(&present);
        let tag = Tag::new("div").attr(
            "test",
            AttrValue::lazy(move || if flag.get() { Some("value") } else { None }),
        );

        assert_eq!(tag.render().unwrap(), r#"<div test="value"></div>"#);
        present.set(false);
        assert_eq!(tag.render().unwrap(), "<div></div>");
        present.set(true);
        assert_eq!(tag.render().unwrap(), r#"<div test="value"></div>"#);
    }

    #[test]
    fn test_absent_child_renders_nothing() {
        let tag = Tag::new("div").child("a").child(ABSENT).child("b");
        assert_eq!(tag.render().unwrap(), "<div>ab</div>");
        assert_eq!(
            Tag::new("p").child(ABSENT).to_html(&RenderOptions::pretty()).unwrap(),
            "<p></p>"
        );
    }

    #[test]
    fn test_bool_child_fails() {
        let tag = Tag::new("ul").child(Tag::new("li")).child(true);
        let err = tag.render().unwrap_err();
        assert!(
            matches!(&err, Error::UnrenderableChildType { location: Location::Child { parent, index: 1 }, .. } if parent == "ul"),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn test_callable_error_aborts_streaming() {
        let tag = Tag::new("div")
            .child(Tag::new("p").child("before"))
            .child(Child::try_lazy(|| Err::<String, _>("boom")))
            .child(Tag::new("p").child("after"));

        let items: Vec<_> = tag.iter_string(&RenderOptions::default()).collect();
        let last = items.last().unwrap();
        assert!(matches!(last, Err(Error::Callable { .. })));
        let before: String = items
            .iter()
            .filter_map(|item| item.as_ref().ok())
            .map(String::as_str)
            .collect();
        assert_eq!(before, "<div><p>before</p>");

        assert!(tag.render().is_err());
        assert!(tag.iter_chunk(4, &RenderOptions::default()).any(|c| c.is_err()));
        assert!(tag.iter_lines("\t").any(|l| l.is_err()));
    }

    #[test]
    fn test_shared_node_mutation_visible() {
        let inner = Tag::new("ul");
        let outer = Tag::new("nav").child(&inner);
        assert_eq!(outer.render().unwrap(), "<nav><ul></ul></nav>");

        inner.append(Tag::new("li").child("late"));
        assert_eq!(outer.render().unwrap(), "<nav><ul><li>late</li></ul></nav>");
    }

    #[test]
    fn test_shared_node_in_two_parents() {
        let shared = Tag::new("b").child("x");
        let tree = Tag::new("div").child(&shared).child(&shared);
        assert_eq!(tree.render().unwrap(), "<div><b>x</b><b>x</b></div>");
    }

    #[test]
    fn test_callable_may_mutate_its_tree() {
        let list = Tag::new("ol");
        let handle = list.clone();
        list.append(Child::lazy(move || {
            if handle.len() < 3 {
                handle.append(Tag::new("li").child("added"));
            }
            "x"
        }));
        assert_eq!(
            list.render().unwrap(),
            "<ol>x<li>added</li></ol>"
        );
    }

    #[test]
    fn test_fragment_children_at_parent_depth() {
        let fragment = Fragment::new().child(Tag::new("li").child("a")).child(Tag::new("li").child("b"));
        let tag = Tag::new("ul").child(fragment);
        assert_eq!(tag.render().unwrap(), "<ul><li>a</li><li>b</li></ul>");
        assert_eq!(
            tag.to_html(&RenderOptions::pretty()).unwrap(),
            "<ul>\n\t<li>a</li>\n\t<li>b</li>\n</ul>"
        );
    }

    #[test]
    fn test_fragment_root() {
        let fragment: Fragment = (0..3).map(|i| Tag::new("p").child(format!("P {i}"))).collect();
        assert_eq!(fragment.render().unwrap(), "<p>P 0</p><p>P 1</p><p>P 2</p>");
        assert_eq!(
            fragment.to_html(&RenderOptions::pretty()).unwrap(),
            "<p>P 0</p>\n<p>P 1</p>\n<p>P 2</p>"
        );
    }

    #[test]
    fn test_fragment_inside_raw_content_stays_raw() {
        let tag = Tag::new("script").child(Fragment::new().child("a < b"));
        assert_eq!(tag.render().unwrap(), "<script>a < b</script>");
    }

    #[test]
    fn test_cycle_guard() {
        let a = Tag::new("div");
        let b = Tag::new("span").child(&a);
        a.append(&b);

        let err = a
            .to_html(&RenderOptions::default().with_max_depth(16))
            .unwrap_err();
        assert!(matches!(err, Error::CycleSuspected { limit: 16, .. }));
    }

    #[test]
    fn test_depth_guard_allows_shallow_trees() {
        let tag = Tag::new("div").child(Tag::new("p").child("ok"));
        assert!(tag.to_html(&RenderOptions::default().with_max_depth(4)).is_ok());
    }

    #[test]
    fn test_chunk_reconstruction() {
        let text = "abcdefghijklmnopqrstuvwxyz012345678";
        assert_eq!(text.len(), 35);
        let tag = Tag::new("div")
            .child(Tag::new("p").child(text))
            .child(Tag::new("p").child(text));
        let dense = tag.render().unwrap();

        let chunks = tag
            .iter_chunk(50, &RenderOptions::default())
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(chunks.concat(), dense);
        assert!(chunks.iter().all(|c| c.chars().count() <= 50));
        assert_eq!(chunks.len(), dense.len().div_ceil(50));
    }

    #[test]
    fn test_chunks_respect_char_boundaries() {
        let tag = Tag::new("p").child("héllo wörld ✓");
        let dense = tag.render().unwrap();
        let chunks = tag
            .iter_chunk(3, &RenderOptions::default())
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(chunks.concat(), dense);
        assert!(chunks.iter().all(|c| c.chars().count() <= 3));
    }

    #[test]
    fn test_chunks_of_large_text_child() {
        let text = "ab✓".repeat(1 << 20);
        let tag = Tag::new("pre").child(text.as_str());

        let mut total = 0;
        let mut last = 0;
        let mut rebuilt = String::with_capacity(text.len() + 11);
        for chunk in tag.iter_chunk(64, &RenderOptions::default()) {
            let chunk = chunk.unwrap();
            if total > 0 {
                assert_eq!(last, 64, "only the final chunk may be short");
            }
            last = chunk.chars().count();
            total += 1;
            rebuilt.push_str(&chunk);
        }

        let chars = text.chars().count() + "<pre></pre>".len();
        assert!(last > 0 && last <= 64);
        assert_eq!(total, chars.div_ceil(64));
        assert_eq!(rebuilt.len(), text.len() + "<pre></pre>".len());
        assert!(rebuilt.starts_with("<pre>ab✓ab✓"));
        assert!(rebuilt.ends_with("ab✓</pre>"));
    }

    #[test]
    #[should_panic(expected = "chunk size must be non-zero")]
    fn test_zero_chunk_size_panics() {
        let _ = Tag::new("p").iter_chunk(0, &RenderOptions::default());
    }

    #[test]
    fn test_lines() {
        let lines = sample()
            .iter_lines("  ")
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(
            lines,
            [
                "<p>",
                "  Hello, World!",
                "  <a href=\"/\">",
                "    go to index",
                "  </a>",
                "  <i></i>",
                "</p>",
            ]
        );
    }

    #[test]
    fn test_empty_fragment_produces_nothing() {
        let fragment = Fragment::new();
        assert_eq!(fragment.render().unwrap(), "");
        assert_eq!(fragment.iter_lines("\t").count(), 0);
        assert_eq!(fragment.iter_chunk(8, &RenderOptions::default()).count(), 0);
    }

    #[test]
    fn test_modes_agree() {
        let tree = Tag::new("html")
            .attr("lang", "en")
            .child(
                Tag::new("head")
                    .child(Tag::new("meta").attr("charset", "utf-8"))
                    .child(Tag::new("style").child("p > a { color: red; }")),
            )
            .child(
                Tag::new("body")
                    .class("page main")
                    .child(sample())
                    .child(Fragment::new().child("loose <text>").child(Tag::new("hr")))
                    .child(Tag::new("pre").child("line one\nline two"))
                    .child(Child::lazy(|| Tag::new("footer").child("ünïcode ✓"))),
            );

        for options in [
            RenderOptions::dense(),
            RenderOptions::pretty(),
            RenderOptions::pretty().with_indent("  "),
        ] {
            all_modes_agree(&tree, &options);
        }
    }

    #[test]
    fn test_write_to() {
        let mut out = Vec::new();
        sample().write_to(&mut out, &RenderOptions::default()).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), sample().render().unwrap());
    }
}
