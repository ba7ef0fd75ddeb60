//! Manual device selection.

use dialoguer::{Input, Select};

use unlockly_core::Session;

use crate::cli::{GlobalOpts, SelectArgs};
use crate::error::CliError;
use crate::output;

use super::util;

const OTHER: &str = "Other (type it in)";

pub fn handle(session: &Session, args: SelectArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let brand = match args.brand {
        Some(brand) => brand,
        None => prompt_brand(session)?,
    };
    let model = match args.model {
        Some(model) => model,
        None => prompt_model(session, &brand)?,
    };

    let device = session
        .detection()
        .manual_select(&brand, &model, args.model_number.as_deref())?;

    let color = output::should_color(&global.color);
    let rendered = output::render_single(
        &global.output,
        device.as_ref(),
        |d| util::device_detail(d, color),
        util::device_id,
    );
    output::print_output(&rendered, global.quiet);
    Ok(())
}

fn prompt_brand(session: &Session) -> Result<String, CliError> {
    let mut items: Vec<String> = session
        .catalog()
        .brands()
        .into_iter()
        .map(str::to_owned)
        .collect();
    items.push(OTHER.to_owned());

    let picked = Select::new()
        .with_prompt("Brand")
        .items(&items)
        .default(0)
        .interact()?;

    if items[picked] == OTHER {
        Ok(Input::new().with_prompt("Brand").interact_text()?)
    } else {
        Ok(items[picked].clone())
    }
}

fn prompt_model(session: &Session, brand: &str) -> Result<String, CliError> {
    let mut items: Vec<String> = session
        .catalog()
        .models_for(brand)
        .into_iter()
        .map(str::to_owned)
        .collect();
    items.push(OTHER.to_owned());

    let picked = Select::new()
        .with_prompt("Model")
        .items(&items)
        .default(0)
        .interact()?;

    if items[picked] == OTHER {
        Ok(Input::new().with_prompt("Model").interact_text()?)
    } else {
        Ok(items[picked].clone())
    }
}
