#![no_main]

use libfuzzer_sys::fuzz_target;
use rewriter::{ContentType, Rewriter, RewriterOptions, element_handler, text_handler};
use sanitizer::{BASIC, RELAXED, Sanitizer};

fuzz_target!(|data: &[u8]| {
    let Some((&selector, html)) = data.split_first() else {
        return;
    };
    let preset = if selector & 1 == 0 { BASIC } else { RELAXED };
    let Ok(sanitizer) = Sanitizer::new(&preset.config()) else {
        return;
    };
    let handlers = vec![
        element_handler("a[href], img", |el| {
            el.set_attribute("data-seen", "1")?;
            el.prepend("<b>", ContentType::Html);
            Ok(())
        }),
        text_handler("p, li", |text| {
            text.after("<i>", ContentType::Html);
            Ok(())
        }),
    ];
    let Ok(handlers) = handlers.into_iter().collect::<Result<Vec<_>, _>>() else {
        return;
    };
    let mut sanitize = Rewriter::sanitize_only(sanitizer.clone());
    let Ok(once) = sanitize.rewrite(html) else {
        return;
    };
    let twice = sanitize.rewrite(&once).expect("sanitized output stays within limits");
    assert_eq!(once, twice, "sanitizing is idempotent");

    let chunked = sanitize
        .rewrite_chunks(html.chunks(usize::from(selector).max(1)))
        .expect("same input, same limits");
    assert_eq!(chunked.as_bytes(), once.as_slice(), "chunking changes nothing");

    if let Ok(mut rewriter) = Rewriter::new(Some(sanitizer), handlers, RewriterOptions::default()) {
        let _ = rewriter.rewrite(html);
    }
});
