//! Named constructors for the standard HTML elements.
//!
//! ```
//! use tagz::Render;
//! use tagz::html::{li, ul};
//!
//! let list = ul().child(li().child("one")).child(li().child("two"));
//! assert_eq!(list.render().unwrap(), "<ul><li>one</li><li>two</li></ul>");
//! ```
//!
//! Other names, including custom elements, go through [`tag`](crate::tag)
//! or an [`Html`](crate::Html) factory.

use crate::tag::Tag;

macro_rules! define_elements {
    ($($name:ident),* $(,)?) => {
        $(
            #[doc = concat!("Create an empty `<", stringify!($name), ">` element.")]
            #[must_use]
            pub fn $name() -> Tag {
                Tag::new(stringify!($name))
            }
        )*
    };
}

define_elements!(
    a, abbr, address, area, article, aside, audio, b, base, bdi, bdo, blockquote, body, br,
    button, canvas, caption, cite, code, col, colgroup, data, datalist, dd, del, details, dfn,
    dialog, div, dl, dt, em, embed, fieldset, figcaption, figure, footer, form, h1, h2, h3, h4,
    h5, h6, head, header, hgroup, hr, html, i, iframe, img, input, ins, kbd, label, legend, li,
    link, main, map, mark, menu, meta, meter, nav, noscript, object, ol, optgroup, option,
    output, p, picture, pre, progress, q, rp, rt, ruby, s, samp, script, search, section,
    select, slot, small, source, span, strong, style, sub, summary, sup, table, tbody, td,
    template, textarea, tfoot, th, thead, time, title, tr, track, u, ul, var, video, wbr
);
