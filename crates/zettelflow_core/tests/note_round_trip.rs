use zettelflow_core::{
    LinkForm, MemoryVaultStore, NoPrompt, NoteFactory, NoteType, PropertyValue, ScriptedPrompt,
    VaultStore, ZettelSettings,
};

fn factory() -> NoteFactory {
    NoteFactory::with_zettel_blueprints(ZettelSettings::default())
}

#[test]
fn saved_note_reloads_with_equal_properties_and_body() {
    let store = MemoryVaultStore::new();
    let factory = factory();

    let mut note = factory.create_note(NoteType::Atomic, None).unwrap();
    note.set_title("Round Trip");
    note.add_tag(vec!["zk", "rust", "notes"]);
    note.set_url("https://example.com/paper");
    note.add_body_content("first point", "⚡️Key Points", 1);
    note.add_body_content("", "⚡️Key Points", 1);
    note.add_body_content("second point", "⚡️Key Points", 1);
    note.add_body_content("see also", "References", 2);

    let handle = note.save(&store, &NoPrompt).unwrap();
    assert_eq!(handle.path, "inbox/atoms/Round Trip.md");

    let loaded = factory.load_from_file(&store, &handle.path).unwrap();
    assert_eq!(loaded.note_type(), NoteType::Atomic);
    assert_eq!(loaded.properties(), note.properties());
    assert_eq!(loaded.body(), note.body());
    assert_eq!(loaded.path(), "inbox/atoms");
    assert_eq!(loaded.title(), "Round Trip");
}

#[test]
fn reloading_does_not_duplicate_list_entries() {
    let store = MemoryVaultStore::new();
    let factory = factory();

    let mut note = factory.create_note(NoteType::Fleeting, None).unwrap();
    note.set_title("Lists");
    note.add_tag("a");
    note.save(&store, &NoPrompt).unwrap();

    let mut loaded = factory
        .load_from_file(&store, "inbox/fleeting/Lists.md")
        .unwrap();
    loaded.rewrite(&store, &NoPrompt).unwrap();
    let reloaded = factory
        .load_from_file(&store, "inbox/fleeting/Lists.md")
        .unwrap();

    assert_eq!(reloaded.properties().tags(), ["a"]);
    assert_eq!(reloaded.properties().aliases(), [note.id().to_string()]);
}

#[test]
fn unknown_type_loads_as_baseline_note() {
    let store = MemoryVaultStore::with_files([(
        "inbox/odd.md",
        "---\ntitle: whatever\ntype: journal\n---\n# Body\ntext\n",
    )])
    .unwrap();

    let note = factory().load_from_file(&store, "inbox/odd.md").unwrap();
    assert_eq!(note.note_type(), NoteType::BASELINE);
    assert_eq!(note.get_type(), NoteType::Fleeting);
    assert_eq!(note.title(), "odd");
    assert_eq!(note.path(), "inbox");
    assert_eq!(note.body().section_at("Body", 1).unwrap().lines(), ["text"]);
}

#[test]
fn quoted_type_selects_its_note_type() {
    let store = MemoryVaultStore::with_files([(
        "zk/quoted.md",
        "---\ntype: \"permanent\"\nurl: 'https://example.com'\n---\n",
    )])
    .unwrap();

    let note = factory().load_from_file(&store, "zk/quoted.md").unwrap();
    assert_eq!(note.note_type(), NoteType::Permanent);
    assert_eq!(note.get_type(), NoteType::Permanent);
    assert_eq!(note.url(), "https://example.com");
}

#[test]
fn flow_lists_and_flags_load_as_typed_values() {
    let store = MemoryVaultStore::with_files([(
        "legacy.md",
        "---\ntype: literature\ntags: [\"book\", \"history\"]\nnew: false\n---\n",
    )])
    .unwrap();

    let note = factory().load_from_file(&store, "legacy.md").unwrap();
    assert_eq!(note.note_type(), NoteType::Literature);
    assert_eq!(note.properties().tags(), ["book", "history"]);
    assert_eq!(note.get_property("new"), Some(&PropertyValue::Flag(false)));
    assert_eq!(note.path(), "");
}

#[test]
fn colliding_title_gets_single_numeric_suffix() {
    let store = MemoryVaultStore::with_files([("inbox/atoms/X.md", "taken")]).unwrap();
    let mut note = factory().create_note(NoteType::Atomic, None).unwrap();
    note.set_title("X");

    note.check_before_save(&store, &NoPrompt).unwrap();

    let suffix = note
        .title()
        .strip_prefix("X ")
        .expect("title should carry a suffix");
    let number: u32 = suffix.parse().expect("suffix should be numeric");
    assert!((1..=100).contains(&number));
}

#[test]
fn blank_title_uses_prompt_answer() {
    let store = MemoryVaultStore::new();
    let prompt = ScriptedPrompt::new([Some("Asked Title")]);
    let mut note = factory().create_note(NoteType::Literature, None).unwrap();

    let handle = note.save(&store, &prompt).unwrap();
    assert_eq!(handle.path, "inbox/literature/Asked Title.md");
    assert_eq!(prompt.questions().len(), 1);
}

#[test]
fn save_inserts_links_under_requested_header() {
    let store = MemoryVaultStore::with_files([(
        "Index.md",
        "# Inbox\n- [[Old]]\n\n# Archive\n- [[Older]]\n",
    )])
    .unwrap();
    let mut note = factory().create_note(NoteType::Fleeting, None).unwrap();
    note.set_title("New Thought");
    note.add_linked_page("Index", Some("Inbox".to_string()), Some(LinkForm::Checklist));
    note.add_linked_page("Missing", None, None);

    note.save(&store, &NoPrompt).unwrap();

    assert_eq!(
        store.read("Index.md").unwrap(),
        "# Inbox\n- [[Old]]\n- [ ] [[New Thought]]\n\n# Archive\n- [[Older]]\n"
    );
    assert!(!store.exists("Missing.md").unwrap());
}
