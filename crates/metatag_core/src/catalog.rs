use crate::model::{AttributeStyle, DefaultsRecord, GroupDefinition, TagDefinition, TagKind};

struct GroupSpec {
    name: &'static str,
    label: &'static str,
    description: &'static str,
    weight: i32,
}

struct TagSpec {
    name: &'static str,
    label: &'static str,
    description: &'static str,
    group: &'static str,
    weight: i32,
    kind: TagKind,
    attribute: AttributeStyle,
    html_name: &'static str,
    multiple: bool,
    absolute_url: bool,
    secure: bool,
}

const fn meta(
    name: &'static str,
    label: &'static str,
    description: &'static str,
    group: &'static str,
    weight: i32,
    attribute: AttributeStyle,
    html_name: &'static str,
) -> TagSpec {
    TagSpec {
        name,
        label,
        description,
        group,
        weight,
        kind: TagKind::Plain,
        attribute,
        html_name,
        multiple: false,
        absolute_url: false,
        secure: false,
    }
}

const fn link(
    name: &'static str,
    label: &'static str,
    description: &'static str,
    group: &'static str,
    weight: i32,
    rel: &'static str,
) -> TagSpec {
    TagSpec {
        name,
        label,
        description,
        group,
        weight,
        kind: TagKind::Url,
        attribute: AttributeStyle::Name,
        html_name: rel,
        multiple: false,
        absolute_url: true,
        secure: false,
    }
}

const GROUPS: &[GroupSpec] = &[
    GroupSpec {
        name: "basic",
        label: "Basic tags",
        description: "Simple meta tags.",
        weight: 1,
    },
    GroupSpec {
        name: "advanced",
        label: "Advanced",
        description: "Meta tags that might not be needed by many sites.",
        weight: 2,
    },
    GroupSpec {
        name: "open_graph",
        label: "Open Graph",
        description: "The Open Graph meta tags are used to control how content is displayed when shared on social networks.",
        weight: 3,
    },
    GroupSpec {
        name: "twitter_cards",
        label: "Twitter Cards",
        description: "Twitter Cards make it possible to attach rich media to tweets that link to the content.",
        weight: 4,
    },
];

const TAGS: &[TagSpec] = &[
    meta(
        "title",
        "Page title",
        "The text to display in the title bar of a visitor's web browser when they view this page.",
        "basic",
        1,
        AttributeStyle::Name,
        "title",
    ),
    meta(
        "description",
        "Description",
        "A brief and concise summary of the page's content.",
        "basic",
        2,
        AttributeStyle::Name,
        "description",
    ),
    meta(
        "abstract",
        "Abstract",
        "A brief and concise summary of the page's content, preferably 150 characters or less.",
        "basic",
        3,
        AttributeStyle::Name,
        "abstract",
    ),
    meta(
        "keywords",
        "Keywords",
        "A comma-separated list of keywords about the page.",
        "basic",
        4,
        AttributeStyle::Name,
        "keywords",
    ),
    link(
        "canonical_url",
        "Canonical URL",
        "The canonical URL for this page.",
        "advanced",
        1,
        "canonical",
    ),
    link(
        "shortlink",
        "Shortlink URL",
        "A brief URL, often created by a URL shortening service.",
        "advanced",
        2,
        "shortlink",
    ),
    link(
        "image_src",
        "Image",
        "An image associated with this page, for use as a thumbnail in social networks.",
        "advanced",
        3,
        "image_src",
    ),
    meta(
        "robots",
        "Robots",
        "Provides search engines with specific directions for what to do when this page is indexed.",
        "advanced",
        4,
        AttributeStyle::Name,
        "robots",
    ),
    meta(
        "referrer",
        "Referrer policy",
        "Indicate to search engines and other page scrapers whether or not links should be followed.",
        "advanced",
        5,
        AttributeStyle::Name,
        "referrer",
    ),
    TagSpec {
        kind: TagKind::HttpHeader,
        ..meta(
            "content_language",
            "Content language",
            "Used to define this page's language code.",
            "advanced",
            6,
            AttributeStyle::HttpEquiv,
            "content-language",
        )
    },
    TagSpec {
        kind: TagKind::HttpHeader,
        ..meta(
            "refresh",
            "Refresh",
            "The number of seconds to wait before refreshing the page.",
            "advanced",
            7,
            AttributeStyle::HttpEquiv,
            "refresh",
        )
    },
    meta(
        "og_site_name",
        "Site name",
        "A human-readable name for the site.",
        "open_graph",
        1,
        AttributeStyle::Property,
        "og:site_name",
    ),
    meta(
        "og_type",
        "Content type",
        "The type of the content, e.g. article.",
        "open_graph",
        2,
        AttributeStyle::Property,
        "og:type",
    ),
    TagSpec {
        absolute_url: true,
        ..meta(
            "og_url",
            "Page URL",
            "Preferred page location or URL to help eliminate duplicate content.",
            "open_graph",
            3,
            AttributeStyle::Property,
            "og:url",
        )
    },
    meta(
        "og_title",
        "Title",
        "The title of the content.",
        "open_graph",
        4,
        AttributeStyle::Property,
        "og:title",
    ),
    meta(
        "og_description",
        "Description",
        "A one to two sentence description of the content.",
        "open_graph",
        5,
        AttributeStyle::Property,
        "og:description",
    ),
    TagSpec {
        kind: TagKind::Image,
        multiple: true,
        absolute_url: true,
        ..meta(
            "og_image",
            "Image",
            "The URL of an image which should represent the content.",
            "open_graph",
            6,
            AttributeStyle::Property,
            "og:image",
        )
    },
    TagSpec {
        kind: TagKind::Image,
        multiple: true,
        absolute_url: true,
        secure: true,
        ..meta(
            "og_image_secure_url",
            "Image Secure URL",
            "The secure URL (HTTPS) of an image which should represent the content.",
            "open_graph",
            7,
            AttributeStyle::Property,
            "og:image:secure_url",
        )
    },
    TagSpec {
        multiple: true,
        ..meta(
            "article_tag",
            "Article tag(s)",
            "Appropriate keywords for this content.",
            "open_graph",
            8,
            AttributeStyle::Property,
            "article:tag",
        )
    },
    meta(
        "twitter_cards_type",
        "Twitter card type",
        "Notes how the card should be displayed.",
        "twitter_cards",
        1,
        AttributeStyle::Name,
        "twitter:card",
    ),
    meta(
        "twitter_cards_title",
        "Title",
        "The page's title, which should be concise.",
        "twitter_cards",
        2,
        AttributeStyle::Name,
        "twitter:title",
    ),
    meta(
        "twitter_cards_description",
        "Description",
        "A description that concisely summarizes the content of the page.",
        "twitter_cards",
        3,
        AttributeStyle::Name,
        "twitter:description",
    ),
    TagSpec {
        kind: TagKind::Image,
        absolute_url: true,
        ..meta(
            "twitter_cards_image",
            "Image URL",
            "The URL to a unique image representing the content of the page.",
            "twitter_cards",
            4,
            AttributeStyle::Name,
            "twitter:image",
        )
    },
];

struct RecordSpec {
    id: &'static str,
    label: &'static str,
    tags: &'static [(&'static str, &'static str)],
}

const INSTALL_DEFAULTS: &[RecordSpec] = &[
    RecordSpec {
        id: "global",
        label: "Global",
        tags: &[
            ("canonical_url", "[current-page:url]"),
            ("title", "[current-page:title] | [site:name]"),
        ],
    },
    RecordSpec {
        id: "front",
        label: "Front page",
        tags: &[
            ("canonical_url", "[site:url]"),
            ("shortlink", "[site:url]"),
        ],
    },
    RecordSpec {
        id: "403",
        label: "403 access denied",
        tags: &[
            ("canonical_url", "[site:url]"),
            ("shortlink", "[site:url]"),
        ],
    },
    RecordSpec {
        id: "404",
        label: "404 page not found",
        tags: &[
            ("canonical_url", "[site:url]"),
            ("shortlink", "[site:url]"),
        ],
    },
    RecordSpec {
        id: "node",
        label: "Content",
        tags: &[
            ("canonical_url", "[node:url]"),
            ("description", "[node:summary]"),
            ("title", "[node:title] | [site:name]"),
        ],
    },
    RecordSpec {
        id: "taxonomy_term",
        label: "Taxonomy term",
        tags: &[
            ("canonical_url", "[term:url]"),
            ("description", "[term:description]"),
            ("title", "[term:name] | [site:name]"),
        ],
    },
    RecordSpec {
        id: "user",
        label: "User",
        tags: &[
            ("canonical_url", "[user:url]"),
            ("description", "[site:name]"),
            ("title", "[user:display-name] | [site:name]"),
        ],
    },
];

pub fn builtin_groups() -> Vec<GroupDefinition> {
    GROUPS
        .iter()
        .map(|spec| GroupDefinition {
            name: spec.name.to_string(),
            label: spec.label.to_string(),
            description: spec.description.to_string(),
            weight: spec.weight,
        })
        .collect()
}

pub fn builtin_tags() -> Vec<TagDefinition> {
    TAGS.iter()
        .map(|spec| TagDefinition {
            name: spec.name.to_string(),
            label: spec.label.to_string(),
            description: spec.description.to_string(),
            group: spec.group.to_string(),
            weight: spec.weight,
            kind: spec.kind,
            attribute: spec.attribute,
            html_name: spec.html_name.to_string(),
            multiple: spec.multiple,
            absolute_url: spec.absolute_url,
            secure: spec.secure,
        })
        .collect()
}

pub fn install_defaults() -> Vec<DefaultsRecord> {
    INSTALL_DEFAULTS.iter().map(record_from_spec).collect()
}

pub fn install_default(id: &str) -> Option<DefaultsRecord> {
    INSTALL_DEFAULTS
        .iter()
        .find(|spec| spec.id == id)
        .map(record_from_spec)
}

fn record_from_spec(spec: &RecordSpec) -> DefaultsRecord {
    spec.tags.iter().fold(
        DefaultsRecord::new(spec.id, spec.label),
        |record, (name, value)| record.with_tag(*name, *value),
    )
}
