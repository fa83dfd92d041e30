#[cfg(test)]
pub mod test {
    use crate::descriptor::OptionDescriptor;
    use crate::enum_table::EnumTable;
    use crate::registry::{OptionId, Registry};

    /// Handles into [`sample_registry`].
    pub struct SampleIds {
        pub some_bool: OptionId,
        pub some_alias: OptionId,
        pub some_enum: OptionId,
        pub some_int: OptionId,
        pub some_uint: OptionId,
        pub some_int64: OptionId,
        pub some_uint64: OptionId,
        pub some_intrange: OptionId,
        pub some_int_list: OptionId,
        pub some_stringlist: OptionId,
        pub some_double: OptionId,
        pub some_string: OptionId,
    }

    pub fn numbers() -> EnumTable {
        EnumTable::new()
            .variant(0, "zero", "nothing")
            .variant(1, "one", "a single thing")
            .variant(2, "two", "a pair")
            .variant(3, "three", "a few")
            .variant(4, "four", "several")
    }

    /// One option of most kinds, seeded from an empty synthetic environment
    /// so tests never read the process env.
    pub fn sample_registry() -> (Registry, SampleIds) {
        let mut registry = Registry::builder()
            .env_prefix("PROJECT_NAME")
            .env_vars(Vec::new())
            .build();
        let some_bool = registry.register(OptionDescriptor::bool("some_bool", false, "a flag"));
        let some_alias = registry.register(OptionDescriptor::alias(
            "some_alias",
            "some_bool=true some_enum=two some_int=3 some_double=4",
        ));
        registry.register(OptionDescriptor::group("--- numbers ---"));
        let some_enum = registry.register(OptionDescriptor::enumeration(
            "some_enum",
            0,
            "how many",
            numbers(),
        ));
        let some_int = registry.register(OptionDescriptor::int32("some_int", 0, "signed count"));
        let some_uint = registry.register(OptionDescriptor::uint32("some_uint", 0, "unsigned count"));
        let some_int64 = registry.register(OptionDescriptor::int64("some_int64", 0, "wide signed"));
        let some_uint64 =
            registry.register(OptionDescriptor::uint64("some_uint64", 0, "wide unsigned"));
        let some_intrange =
            registry.register(OptionDescriptor::int_range("some_intrange", "address window"));
        let some_int_list =
            registry.register(OptionDescriptor::int_list("some_intList", "addresses", 4));
        let some_stringlist =
            registry.register(OptionDescriptor::string_list("some_stringlist", "trailing words"));
        let some_double = registry.register(OptionDescriptor::double("some_double", 0.0, "ratio"));
        let some_string =
            registry.register(OptionDescriptor::string("some_string", "default", "free text"));

        let ids = SampleIds {
            some_bool,
            some_alias,
            some_enum,
            some_int,
            some_uint,
            some_int64,
            some_uint64,
            some_intrange,
            some_int_list,
            some_stringlist,
            some_double,
            some_string,
        };
        (registry, ids)
    }

    #[test]
    fn sample_registry_starts_at_defaults() {
        let (registry, ids) = sample_registry();
        assert_eq!(registry.len(), 13);
        assert!(registry.iter().all(|o| !o.is_set()));
        assert_eq!(registry[ids.some_string].value().as_str(), Some("default"));
        assert_eq!(registry[ids.some_enum].enum_label(), Some("zero"));
        assert_eq!(registry[ids.some_alias].usage().split(' ').count(), 4);
    }

    #[test]
    fn sample_registry_env_seeding() {
        let mut registry = Registry::builder()
            .env_prefix("PROJECT_NAME")
            .env_vars([("PROJECT_NAME_SOME_ENUM".to_string(), "four".to_string())])
            .build();
        let id = registry.register(OptionDescriptor::enumeration(
            "some_enum",
            0,
            "how many",
            numbers(),
        ));
        assert_eq!(registry[id].value().as_u32(), Some(4));
        assert!(registry[id].is_set());
    }
}
