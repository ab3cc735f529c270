//! The `quizgate models` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizgate_insights::create_generator;

use super::{GlobalOpts, Session};

pub fn execute(opts: &GlobalOpts, provider_filter: Option<&str>) -> Result<()> {
    let session = Session::open(opts)?;

    let mut names: Vec<&String> = session.config.providers.keys().collect();
    names.sort();

    let mut table = Table::new();
    table.set_header(vec!["Provider", "Model", "Name", "Context", "Default"]);
    let mut found_any = false;

    for name in names {
        if provider_filter.is_some_and(|filter| filter != name.as_str()) {
            continue;
        }

        let generator = create_generator(&session.config.providers[name])?;
        for model in generator.available_models() {
            found_any = true;
            let is_default = model.id == session.config.default_model;
            table.add_row(vec![
                Cell::new(name),
                Cell::new(&model.id),
                Cell::new(&model.name),
                Cell::new(format!("{}K", model.max_context / 1000)),
                Cell::new(if is_default { "*" } else { "" }),
            ]);
        }
    }

    if found_any {
        println!("{table}");
    } else {
        println!("No providers configured. Run `quizgate init` to create a config file.");
    }
    Ok(())
}
