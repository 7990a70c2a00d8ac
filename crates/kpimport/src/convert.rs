//! Walk a parsed KeePass document and build the archive tree.
//!
//! Missing structure never fails the walk: an absent `Group`, `Entry` or
//! `String` list is zero items and an absent `Name`, `Key` or `Value` is the
//! empty string.

use kpxml::{normalize, XmlDocument, XmlElement};
use tracing::{debug, warn};
use vault_core::{Archive, Entry, GroupContainer, PrimaryField};

/// Location of the group tree inside a KeePass 2.x export.
pub const ROOT_PATH: [&str; 2] = ["KeePassFile", "Root"];

const GROUP: &str = "Group";
const ENTRY: &str = "Entry";
const NAME: &str = "Name";
const STRING: &str = "String";
const KEY: &str = "Key";
const VALUE: &str = "Value";

/// The element whose `Group` children become the archive's top-level groups.
pub fn root_group(document: &XmlDocument) -> Option<&XmlElement> {
    document.find_path(&ROOT_PATH)
}

/// Convert a whole document. A document without `KeePassFile/Root` yields an
/// empty archive.
pub fn convert_document(document: &XmlDocument) -> Archive {
    let mut archive = Archive::new();
    match root_group(document) {
        Some(root) => convert(root, &mut archive),
        None => {
            warn!(
                element = %document.root().name(),
                "KeePass root group not found; importing an empty archive"
            );
            convert(&XmlElement::default(), &mut archive);
        }
    }
    archive
}

/// Create one destination group per `Group` child of `source`, recursing into
/// nested groups before converting each group's own entries.
///
/// Entries attached directly to `source` are not visited.
pub fn convert<C: GroupContainer>(source: &XmlElement, destination: &mut C) {
    for subgroup in source.children_named(GROUP) {
        let name_value = subgroup.value(NAME);
        if name_value.is_missing() {
            debug!("group without a Name element");
        }
        let group = destination.create_group(normalize(&name_value));
        if subgroup.has_children_named(GROUP) {
            convert(subgroup, &mut *group);
        }
        for source_entry in subgroup.children_named(ENTRY) {
            convert_entry(source_entry, group.create_entry());
        }
    }
}

/// Route each `String` key/value pair to a primary field or to metadata.
/// Repeated keys overwrite earlier ones.
pub fn convert_entry(source: &XmlElement, entry: &mut Entry) {
    if !source.has_children_named(STRING) {
        debug!("entry without String fields");
        return;
    }
    for pair in source.children_named(STRING) {
        let actual_key = normalize(&pair.value(KEY));
        let actual_value = normalize(&pair.value(VALUE));
        match PrimaryField::from_key(&actual_key) {
            Some(field) => entry.set_property(field, actual_value),
            None => entry.set_meta(actual_key, actual_value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kpxml::parse_document;
    use vault_core::Group;

    fn string_pair(key: &str, value: &str) -> XmlElement {
        XmlElement::new(STRING)
            .with_child(XmlElement::new(KEY).with_text(key))
            .with_child(XmlElement::new(VALUE).with_text(value))
    }

    fn names(groups: &[Group]) -> Vec<&str> {
        groups.iter().map(Group::name).collect()
    }

    #[test]
    fn classify_entry_strings() {
        let source = XmlElement::new(ENTRY)
            .with_child(string_pair("TITLE", "Mail"))
            .with_child(string_pair("UserName", "me@x.com"))
            .with_child(string_pair("password", "secret"))
            .with_child(string_pair("URL", "mail.example.com"))
            .with_child(string_pair("Notes", ""));
        let mut entry = Entry::new();
        convert_entry(&source, &mut entry);
        assert_eq!(entry.title(), "Mail");
        assert_eq!(entry.username(), "me@x.com");
        assert_eq!(entry.password(), "secret");
        assert_eq!(entry.meta().len(), 2);
        assert_eq!(entry.meta_value("URL"), Some("mail.example.com"));
        assert_eq!(entry.meta_value("Notes"), Some(""));
    }

    #[test]
    fn duplicate_keys_last_wins() {
        let source = XmlElement::new(ENTRY)
            .with_child(string_pair("Title", "first"))
            .with_child(string_pair("title", "second"))
            .with_child(string_pair("Tag", "a"))
            .with_child(string_pair("Tag", "b"));
        let mut entry = Entry::new();
        convert_entry(&source, &mut entry);
        assert_eq!(entry.title(), "second");
        assert_eq!(entry.meta_value("Tag"), Some("b"));
    }

    #[test]
    fn incomplete_pairs_default_to_empty() {
        let source = XmlElement::new(ENTRY)
            .with_child(XmlElement::new(STRING).with_child(XmlElement::new(KEY).with_text("URL")))
            .with_child(XmlElement::new(STRING).with_child(XmlElement::new(VALUE).with_text("orphan")))
            .with_child(XmlElement::new(STRING));
        let mut entry = Entry::new();
        convert_entry(&source, &mut entry);
        assert_eq!(entry.meta_value("URL"), Some(""));
        assert_eq!(entry.meta_value(""), Some(""));
        assert_eq!(entry.meta().len(), 2);
    }

    #[test]
    fn nested_groups_keep_order_and_parents() {
        let xml = r#"<KeePassFile><Root>
            <Group>
                <Name>Database</Name>
                <Entry><String><Key>Title</Key><Value>top</Value></String></Entry>
                <Group><Name>Email</Name>
                    <Entry><String><Key>Title</Key><Value>one</Value></String></Entry>
                    <Entry><String><Key>Title</Key><Value>two</Value></String></Entry>
                </Group>
                <Group><Name>Banking</Name>
                    <Group><Name>Cards</Name></Group>
                </Group>
            </Group>
            <Group><Name>Second</Name></Group>
        </Root></KeePassFile>"#;
        let doc = parse_document(xml).expect("parse xml");
        let archive = convert_document(&doc);

        assert_eq!(archive.group_count(), 5);
        assert_eq!(archive.entry_count(), 3);
        assert_eq!(names(archive.groups()), ["Database", "Second"]);
        let database = &archive.groups()[0];
        assert_eq!(names(database.groups()), ["Email", "Banking"]);
        assert_eq!(database.entries()[0].title(), "top");
        let email = archive.find_group("Database/Email").expect("email");
        let titles: Vec<&str> = email.entries().iter().map(Entry::title).collect();
        assert_eq!(titles, ["one", "two"]);
        assert!(archive.find_group("Database/Banking/Cards").is_ok());
    }

    #[test]
    fn entries_directly_under_root_are_skipped() {
        let xml = r#"<KeePassFile><Root>
            <Entry><String><Key>Title</Key><Value>stray</Value></String></Entry>
            <Group><Name>Kept</Name></Group>
        </Root></KeePassFile>"#;
        let archive = convert_document(&parse_document(xml).expect("parse xml"));
        assert_eq!(archive.group_count(), 1);
        assert_eq!(archive.entry_count(), 0);
    }

    #[test]
    fn missing_root_yields_empty_archive() {
        for xml in [
            "<KeePassFile><Meta/></KeePassFile>",
            "<Database><Root><Group><Name>x</Name></Group></Root></Database>",
            "<KeePassFile><Root/></KeePassFile>",
        ] {
            let archive = convert_document(&parse_document(xml).expect("parse xml"));
            assert!(archive.is_empty(), "{xml}");
            assert_eq!(archive.entry_count(), 0);
        }
    }

    #[test]
    fn unnamed_group_and_empty_entry() {
        let xml = "<KeePassFile><Root><Group><Entry/><Entry><UUID>abc</UUID></Entry></Group></Root></KeePassFile>";
        let archive = convert_document(&parse_document(xml).expect("parse xml"));
        let group = &archive.groups()[0];
        assert_eq!(group.name(), "");
        assert_eq!(group.entries().len(), 2);
        assert_eq!(group.entries()[1], Entry::new());
    }

    #[test]
    fn protected_and_repeated_values() {
        let xml = r#"<KeePassFile><Root><Group>
            <Name>Vault</Name><Name>Extra</Name>
            <Entry>
                <String><Key>Password</Key><Value ProtectInMemory="True">hunter2</Value></String>
                <String><Key>Aliases</Key><Value>a</Value><Value>b</Value></String>
                <String><Key>Blank</Key><Value ProtectInMemory="True"/></String>
            </Entry>
        </Group></Root></KeePassFile>"#;
        let archive = convert_document(&parse_document(xml).expect("parse xml"));
        let group = &archive.groups()[0];
        assert_eq!(group.name(), "Vault, Extra");
        let entry = &group.entries()[0];
        assert_eq!(entry.password(), "hunter2");
        assert_eq!(entry.meta_value("Aliases"), Some("a, b"));
        assert_eq!(entry.meta_value("Blank"), Some(""));
    }

    #[test]
    fn convert_into_existing_group() {
        let source = XmlElement::new(GROUP).with_child(
            XmlElement::new(GROUP).with_child(XmlElement::new(NAME).with_text("Child")),
        );
        let mut parent = Group::new("Parent");
        convert(&source, &mut parent);
        assert_eq!(names(parent.groups()), ["Child"]);
    }
}
