#![feature(test)]
extern crate mdnterm;
extern crate test;

use ::test::Bencher;

use mdnterm::{config, from_read};

fn make_article(content: &str) -> String {
    String::from("<html><body><article>") + content + "</article></body></html>"
}

fn make_list(item: &str, depth: usize, width: usize) -> String {
    if depth == 0 {
        return item.to_string();
    }
    let mut result = String::from("<ul>");
    for _ in 0..width {
        result.push_str("<li>");
        result.push_str(item);
        result.push_str(&make_list(item, depth - 1, width));
        result.push_str("</li>");
    }
    result.push_str("</ul>");
    result
}

fn make_code(lines: usize) -> String {
    let mut result = String::from("<pre><code>");
    for i in 0..lines {
        result.push_str(&format!(
            r#"<span class="token keyword">const</span> x{} <span class="token operator">=</span> <span class="token number">{}</span><span class="token punctuation">;</span>"#,
            i, i
        ));
        result.push('\n');
    }
    result.push_str("</code></pre>");
    result
}

#[bench]
fn bench_empty(b: &mut Bencher) {
    b.iter(|| from_read(make_article("").as_bytes()));
}

#[bench]
fn bench_list_3_4(b: &mut Bencher) {
    let html = make_article(&make_list("item", 3, 4));
    b.iter(|| from_read(html.as_bytes()));
}

#[bench]
fn bench_code_200(b: &mut Bencher) {
    let html = make_article(&make_code(200));
    b.iter(|| from_read(html.as_bytes()));
}

#[bench]
fn bench_code_200_colour(b: &mut Bencher) {
    let html = make_article(&make_code(200));
    let conf = config::current().colour(true);
    b.iter(|| conf.string_from_read(html.as_bytes()));
}

#[bench]
fn bench_code_200_numbered(b: &mut Bencher) {
    let html = make_article(&make_code(200));
    let conf = config::current().numbered_pre(true);
    b.iter(|| conf.string_from_read(html.as_bytes()));
}
