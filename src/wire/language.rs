/// The code languages the API accepts.
const NOTION_LANGUAGES: &[&str] = &[
    "abap",
    "arduino",
    "bash",
    "basic",
    "c",
    "c#",
    "c++",
    "clojure",
    "coffeescript",
    "css",
    "dart",
    "diff",
    "docker",
    "elixir",
    "elm",
    "erlang",
    "f#",
    "flow",
    "fortran",
    "gherkin",
    "glsl",
    "go",
    "graphql",
    "groovy",
    "haskell",
    "html",
    "java",
    "javascript",
    "json",
    "julia",
    "kotlin",
    "latex",
    "less",
    "lisp",
    "livescript",
    "lua",
    "makefile",
    "markdown",
    "markup",
    "matlab",
    "mermaid",
    "nix",
    "objective-c",
    "ocaml",
    "pascal",
    "perl",
    "php",
    "plain text",
    "powershell",
    "prolog",
    "protobuf",
    "python",
    "r",
    "reason",
    "ruby",
    "rust",
    "sass",
    "scala",
    "scheme",
    "scss",
    "shell",
    "sql",
    "swift",
    "typescript",
    "vb.net",
    "verilog",
    "vhdl",
    "visual basic",
    "webassembly",
    "xml",
    "yaml",
];

/// Common info-string spellings that aren't the API's names.
const ALIASES: &[(&str, &str)] = &[
    ("cc", "c++"),
    ("cpp", "c++"),
    ("cs", "c#"),
    ("csharp", "c#"),
    ("console", "shell"),
    ("cxx", "c++"),
    ("dockerfile", "docker"),
    ("ex", "elixir"),
    ("exs", "elixir"),
    ("fsharp", "f#"),
    ("golang", "go"),
    ("hs", "haskell"),
    ("js", "javascript"),
    ("jsx", "javascript"),
    ("kt", "kotlin"),
    ("make", "makefile"),
    ("md", "markdown"),
    ("objc", "objective-c"),
    ("plain", "plain text"),
    ("plaintext", "plain text"),
    ("proto", "protobuf"),
    ("ps1", "powershell"),
    ("pwsh", "powershell"),
    ("py", "python"),
    ("rb", "ruby"),
    ("rs", "rust"),
    ("sh", "shell"),
    ("tex", "latex"),
    ("text", "plain text"),
    ("ts", "typescript"),
    ("tsx", "typescript"),
    ("txt", "plain text"),
    ("wasm", "webassembly"),
    ("yml", "yaml"),
    ("zsh", "shell"),
];

pub const DEFAULT_LANGUAGE: &str = "plain text";

/// Maps a code block's info string onto one of the API's language names. Anything unrecognized is plain text.
pub fn notion_language(language: Option<&str>) -> &'static str {
    let Some(language) = language.map(|l| l.trim().to_lowercase()).filter(|l| !l.is_empty()) else {
        return DEFAULT_LANGUAGE;
    };
    if let Some(known) = NOTION_LANGUAGES.iter().find(|known| **known == language) {
        return known;
    }
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == language)
        .map_or(DEFAULT_LANGUAGE, |(_, known)| known)
}
