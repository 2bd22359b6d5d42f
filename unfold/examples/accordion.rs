use std::fs::File;
use std::time::Duration;

use foldom::{Document, Height, MemoryDocument, Node, Rule};
use simplelog::{Config as LogConfig, LevelFilter, WriteLogger};
use unfold::{Config, Controller};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set up file logging
    let log_file = File::create("accordion.log")?;
    WriteLogger::init(LevelFilter::Debug, LogConfig::default(), log_file)?;

    let mut doc = MemoryDocument::new();
    doc.add_rule(Rule::new(".section")?.height(Height::Px(0)));
    doc.add_rule(Rule::new(".section.open")?.height(Height::Auto));

    let mut headers = Vec::new();
    let mut sections = Vec::new();
    for (i, lines) in [3u32, 8, 5].into_iter().enumerate() {
        headers.push(doc.append_to_body(Node::button().id(format!("header-{i}")).class("header")));
        sections.push(doc.append_to_body(
            Node::div()
                .id(format!("section-{i}"))
                .class("section")
                .content_height(lines * 16),
        ));
    }

    let mut controller = Controller::new();
    let config = Config::new()
        .class_on_expanded("open")
        .class_on_collapsed("closed");
    for i in 0..headers.len() {
        controller.register_toggle(
            &mut doc,
            &format!("#header-{i}"),
            &format!("#section-{i}"),
            Some(config.clone()),
        )?;
    }
    controller.register_collapser(&mut doc, "#header-0", ".section", Some(config))?;
    controller.register_toggle(
        &mut doc,
        "#header-1",
        "#section-1",
        Some(Config::new().class_on_expanded("open")),
    )?;

    for header in [headers[1], headers[2], headers[1]] {
        let notifications = doc.click(header);
        controller.dispatch(&mut doc, notifications)?;

        for _ in 0..4 {
            let notifications = doc.advance(Duration::from_millis(100));
            controller.dispatch(&mut doc, notifications)?;
            let heights = sections
                .iter()
                .map(|s| doc.client_height(*s).map(|h| format!("{h:>4}px")))
                .collect::<Result<Vec<_>, _>>()?;
            println!("t={:?} {}", doc.now(), heights.join(" "));
        }
    }

    // Header 0 was rebound as a collapser for every section.
    let notifications = doc.click(headers[0]);
    controller.dispatch(&mut doc, notifications)?;
    let notifications = doc.finish_transitions();
    controller.dispatch(&mut doc, notifications)?;

    for section in &sections {
        println!(
            "{} -> {:?}",
            section,
            controller.engine.state_of(&doc, *section)?
        );
    }
    Ok(())
}
