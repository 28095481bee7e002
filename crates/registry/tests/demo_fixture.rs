use notepal_registry::{ItemRegistry, RegistryFixture};
use notepal_types::Repository;

fn demo_registry() -> ItemRegistry {
    ItemRegistry::from_fixture(RegistryFixture::demo().expect("demo fixture parses"))
}

#[test]
fn demo_exposes_custom_commands_and_themes() {
    let registry = demo_registry();
    let commands = registry.items_by_tag("$:/tags/CommandPaletteCommand");
    assert!(commands.len() >= 5, "expected custom commands, got {commands:?}");
    let themes = registry.items_by_tag("$:/tags/CommandPaletteTheme");
    assert_eq!(
        themes,
        vec![
            "$:/plugins/linonetwo/commandpalette/Compact.css",
            "$:/plugins/linonetwo/commandpalette/Spacious.css"
        ]
    );
}

#[test]
fn demo_story_and_drafts() {
    let registry = demo_registry();
    assert_eq!(registry.filter_query("[list[$:/StoryList]]").unwrap(), vec!["Home", "Getting Started"]);
    assert_eq!(
        registry.filter_query("[has:field[draft.of]]").unwrap(),
        vec!["Draft of 'Meeting Notes'"]
    );
}

#[test]
fn demo_tag_search_with_spaces() {
    let registry = demo_registry();
    let tagged = registry
        .filter_query("[all[tiddlers+system+shadows]tag[side project]]")
        .unwrap();
    assert_eq!(tagged, vec!["Getting Started", "Meeting Notes"]);
}

#[test]
fn tagging_a_shadow_theme_makes_it_a_stylesheet() {
    let registry = demo_registry();
    let spacious = "$:/plugins/linonetwo/commandpalette/Spacious.css";
    assert!(registry.add_tag(spacious, "$:/tags/Stylesheet"));
    assert!(registry.get_item(spacious).unwrap().has_tag("$:/tags/Stylesheet"));
    assert!(registry.item_or_shadow_exists(spacious));
}
