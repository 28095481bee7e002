//! Applying palette effects against the item registry and the draft field.

use tracing::{info, warn};

use notepal_engine::record_navigation;
use notepal_types::{Effect, FieldOp, Item, NewItem, TAGS_FIELD};

use crate::app::App;

/// Title used when a creation request arrives without one.
const UNTITLED: &str = "New Tiddler";

pub(crate) fn apply(app: &mut App, effect: Effect) {
    match effect {
        Effect::Navigate { title } => navigate(app, &title),
        Effect::CreateItem(new_item) => create_item(app, new_item),
        Effect::FieldMutate { item, op, value } => {
            let changed = match op {
                FieldOp::AddTag => app.registry.add_tag(&item, &value),
                FieldOp::RemoveTag => app.registry.remove_tag(&item, &value),
            };
            info!(item = %item, tag = %value, ?op, changed, "Applied tag change");
            app.status = match (op, changed) {
                (FieldOp::AddTag, true) => format!("Tagged {item} with {value}"),
                (FieldOp::RemoveTag, true) => format!("Removed {value} from {item}"),
                (_, false) => format!("{item} unchanged"),
            };
        }
        Effect::SendMessage { message, param, params } => {
            info!(bus_message = %message, ?param, ?params, "Message sent");
            app.status = match param {
                Some(param) => format!("Sent {message} ({param})"),
                None => format!("Sent {message}"),
            };
        }
        Effect::InvokeActionString { action, variables } => {
            info!(action = %action, ?variables, "Action string invoked");
            app.status = format!("Ran action {action}");
        }
        Effect::RestoreFocus { caret } => {
            if let Some(caret) = caret {
                app.draft.set_cursor(caret);
            }
        }
        Effect::ReplaceFocusedValue { value, caret } => {
            app.draft.set_input(value);
            app.draft.set_cursor(caret);
        }
    }
}

fn navigate(app: &mut App, title: &str) {
    app.registry.open_in_story(title);
    if let Err(error) = record_navigation(app.store.as_ref(), title) {
        warn!(title, %error, "Failed to record navigation");
    }
    app.status = format!("Opened {title}");
}

fn create_item(app: &mut App, new_item: NewItem) {
    let NewItem { title, tags, fields } = new_item;
    let title = if title.is_empty() { UNTITLED.to_string() } else { title };
    let mut item = Item::new(title.clone());
    if !tags.is_empty() {
        item.fields.insert(TAGS_FIELD.to_string(), tags);
    }
    item.fields.extend(fields);
    app.registry.insert(item);
    info!(title = %title, "Item created");
    navigate(app, &title);
    app.status = format!("Created {title}");
}
