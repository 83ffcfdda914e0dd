// benches/parse.rs
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use hallbot::catalog::{parse_attendees, parse_listing, parse_menu};

fn synth_listing(events: usize) -> String {
    let mut doc = String::from(
        "<html><body><table class=\"list\"><tr><td>nav</td></tr></table>\n<table class=\"list\">",
    );
    for i in 0..events {
        doc.push_str(&format!(
            "<tr><td><a href=\"index.php?event={i}&amp;date=pick\">Event number {i}</a></td></tr>"
        ));
    }
    doc.push_str("</table></body></html>");
    doc
}

fn synth_event_page(attendees: usize) -> String {
    let mut doc = String::from("<html><body><table class=\"list\">");
    for i in 0..attendees {
        doc.push_str(&format!("<tr><td>Attendee Number {i}</td><td>(guest)</td></tr>"));
    }
    doc.push_str("</table><div class=\"menu\">  Soup  <br>  Main  <br>  Pudding  </div></body></html>");
    doc
}

fn bench_parsers(c: &mut Criterion) {
    let listing = synth_listing(40);
    let event_page = synth_event_page(200);

    c.bench_function("parse_listing_40", |b| {
        b.iter(|| {
            let events = parse_listing(black_box(&listing)).unwrap();
            black_box(events.len())
        })
    });

    c.bench_function("parse_attendees_200", |b| {
        b.iter(|| {
            let names = parse_attendees(black_box(&event_page)).unwrap();
            black_box(names.len())
        })
    });

    c.bench_function("parse_menu", |b| {
        b.iter(|| black_box(parse_menu(black_box(&event_page))))
    });
}

criterion_group!(benches, bench_parsers);
criterion_main!(benches);
