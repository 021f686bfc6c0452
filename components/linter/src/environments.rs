//! Predefined global identifiers
//!
//! The standard library globals are always known. Environment profiles
//! (`browser`, `node`, ...) add their own sets when the matching option is
//! on. `true` marks a global the analyzed code may assign to.

use indexmap::IndexMap;
use std::collections::HashSet;

use crate::options::{Flags, Options};

const BROWSER: &[(&str, bool)] = &[
    ("ArrayBuffer", false), ("ArrayBufferView", false), ("Audio", false), ("Blob", false),
    ("addEventListener", false), ("applicationCache", false), ("atob", false), ("blur", false),
    ("btoa", false), ("clearInterval", false), ("clearTimeout", false), ("close", false),
    ("closed", false), ("DataView", false), ("DOMParser", false), ("defaultStatus", false),
    ("document", false), ("event", false), ("FileReader", false), ("Float32Array", false),
    ("Float64Array", false), ("FormData", false), ("focus", false), ("frames", false),
    ("getComputedStyle", false), ("HTMLElement", false), ("HTMLAnchorElement", false),
    ("HTMLBaseElement", false), ("HTMLBlockquoteElement", false), ("HTMLBodyElement", false),
    ("HTMLBRElement", false), ("HTMLButtonElement", false), ("HTMLCanvasElement", false),
    ("HTMLDirectoryElement", false), ("HTMLDivElement", false), ("HTMLDListElement", false),
    ("HTMLFieldSetElement", false), ("HTMLFontElement", false), ("HTMLFormElement", false),
    ("HTMLFrameElement", false), ("HTMLFrameSetElement", false), ("HTMLHeadElement", false),
    ("HTMLHeadingElement", false), ("HTMLHRElement", false), ("HTMLHtmlElement", false),
    ("HTMLIFrameElement", false), ("HTMLImageElement", false), ("HTMLInputElement", false),
    ("HTMLIsIndexElement", false), ("HTMLLabelElement", false), ("HTMLLayerElement", false),
    ("HTMLLegendElement", false), ("HTMLLIElement", false), ("HTMLLinkElement", false),
    ("HTMLMapElement", false), ("HTMLMenuElement", false), ("HTMLMetaElement", false),
    ("HTMLModElement", false), ("HTMLObjectElement", false), ("HTMLOListElement", false),
    ("HTMLOptGroupElement", false), ("HTMLOptionElement", false),
    ("HTMLParagraphElement", false), ("HTMLParamElement", false), ("HTMLPreElement", false),
    ("HTMLQuoteElement", false), ("HTMLScriptElement", false), ("HTMLSelectElement", false),
    ("HTMLStyleElement", false), ("HTMLTableCaptionElement", false),
    ("HTMLTableCellElement", false), ("HTMLTableColElement", false),
    ("HTMLTableElement", false), ("HTMLTableRowElement", false),
    ("HTMLTableSectionElement", false), ("HTMLTextAreaElement", false),
    ("HTMLTitleElement", false), ("HTMLUListElement", false), ("HTMLVideoElement", false),
    ("history", false), ("Int16Array", false), ("Int32Array", false), ("Int8Array", false),
    ("Image", false), ("length", false), ("localStorage", false), ("location", false),
    ("MessageChannel", false), ("MessageEvent", false), ("MessagePort", false),
    ("moveBy", false), ("moveTo", false), ("MutationObserver", false), ("name", false),
    ("Node", false), ("NodeFilter", false), ("navigator", false), ("onbeforeunload", true),
    ("onblur", true), ("onerror", true), ("onfocus", true), ("onload", true),
    ("onresize", true), ("onunload", true), ("open", false), ("openDatabase", false),
    ("opener", false), ("Option", false), ("parent", false), ("print", false),
    ("removeEventListener", false), ("resizeBy", false), ("resizeTo", false), ("screen", false),
    ("scroll", false), ("scrollBy", false), ("scrollTo", false), ("sessionStorage", false),
    ("setInterval", false), ("setTimeout", false), ("SharedWorker", false), ("status", false),
    ("top", false), ("Uint16Array", false), ("Uint32Array", false), ("Uint8Array", false),
    ("WebSocket", false), ("window", false), ("Worker", false), ("XMLHttpRequest", false),
    ("XMLSerializer", false), ("XPathEvaluator", false), ("XPathException", false),
    ("XPathExpression", false), ("XPathNamespace", false), ("XPathNSResolver", false),
    ("XPathResult", false),
];

const COUCH: &[(&str, bool)] = &[
    ("require", false), ("respond", false), ("getRow", false), ("emit", false), ("send", false),
    ("start", false), ("sum", false), ("log", false), ("exports", false), ("module", false),
    ("provides", false),
];

const DEVEL: &[(&str, bool)] = &[
    ("alert", false), ("confirm", false), ("console", false), ("Debug", false),
    ("opera", false), ("prompt", false),
];

const DOJO: &[(&str, bool)] = &[
    ("dojo", false), ("dijit", false), ("dojox", false), ("define", false), ("require", false),
];

const JQUERY: &[(&str, bool)] = &[
    ("$", false), ("jQuery", false),
];

const MOOTOOLS: &[(&str, bool)] = &[
    ("$", false), ("$$", false), ("Asset", false), ("Browser", false), ("Chain", false),
    ("Class", false), ("Color", false), ("Cookie", false), ("Core", false), ("Document", false),
    ("DomReady", false), ("DOMEvent", false), ("DOMReady", false), ("Drag", false),
    ("Element", false), ("Elements", false), ("Event", false), ("Events", false), ("Fx", false),
    ("Group", false), ("Hash", false), ("HtmlTable", false), ("Iframe", false),
    ("IframeShim", false), ("InputValidator", false), ("instanceOf", false),
    ("Keyboard", false), ("Locale", false), ("Mask", false), ("MooTools", false),
    ("Native", false), ("Options", false), ("OverText", false), ("Request", false),
    ("Scroller", false), ("Slick", false), ("Slider", false), ("Sortables", false),
    ("Spinner", false), ("Swiff", false), ("Tips", false), ("Type", false), ("typeOf", false),
    ("URI", false), ("Window", false),
];

const NODE: &[(&str, bool)] = &[
    ("__filename", false), ("__dirname", false), ("Buffer", false), ("console", false),
    ("exports", true), ("GLOBAL", false), ("global", false), ("module", false),
    ("process", false), ("require", false), ("setTimeout", false), ("clearTimeout", false),
    ("setInterval", false), ("clearInterval", false),
];

const PROTOTYPEJS: &[(&str, bool)] = &[
    ("$", false), ("$$", false), ("$A", false), ("$F", false), ("$H", false), ("$R", false),
    ("$break", false), ("$continue", false), ("$w", false), ("Abstract", false),
    ("Ajax", false), ("Class", false), ("Enumerable", false), ("Element", false),
    ("Event", false), ("Field", false), ("Form", false), ("Hash", false), ("Insertion", false),
    ("ObjectRange", false), ("PeriodicalExecuter", false), ("Position", false),
    ("Prototype", false), ("Selector", false), ("Template", false), ("Toggle", false),
    ("Try", false), ("Autocompleter", false), ("Builder", false), ("Control", false),
    ("Draggable", false), ("Draggables", false), ("Droppables", false), ("Effect", false),
    ("Sortable", false), ("SortableObserver", false), ("Sound", false),
    ("Scriptaculous", false),
];

const RHINO: &[(&str, bool)] = &[
    ("defineClass", false), ("deserialize", false), ("gc", false), ("help", false),
    ("importPackage", false), ("java", false), ("load", false), ("loadClass", false),
    ("print", false), ("quit", false), ("readFile", false), ("readUrl", false),
    ("runCommand", false), ("seal", false), ("serialize", false), ("spawn", false),
    ("sync", false), ("toint32", false), ("version", false),
];

const STANDARD: &[(&str, bool)] = &[
    ("Array", false), ("Boolean", false), ("Date", false), ("decodeURI", false),
    ("decodeURIComponent", false), ("encodeURI", false), ("encodeURIComponent", false),
    ("Error", false), ("eval", false), ("EvalError", false), ("Function", false),
    ("hasOwnProperty", false), ("isFinite", false), ("isNaN", false), ("JSON", false),
    ("Map", false), ("Math", false), ("NaN", false), ("Number", false), ("Object", false),
    ("parseInt", false), ("parseFloat", false), ("RangeError", false),
    ("ReferenceError", false), ("RegExp", false), ("Set", false), ("String", false),
    ("SyntaxError", false), ("TypeError", false), ("URIError", false), ("WeakMap", false),
];

const NONSTANDARD: &[(&str, bool)] = &[
    ("escape", false), ("unescape", false),
];

const WORKER: &[(&str, bool)] = &[
    ("importScripts", true), ("postMessage", true), ("self", true),
];

const WSH: &[(&str, bool)] = &[
    ("ActiveXObject", true), ("Enumerator", true), ("GetObject", true), ("ScriptEngine", true),
    ("ScriptEngineBuildVersion", true), ("ScriptEngineMajorVersion", true),
    ("ScriptEngineMinorVersion", true), ("VBArray", true), ("WSH", true), ("WScript", true),
    ("XDomainRequest", true),
];

const YUI: &[(&str, bool)] = &[
    ("YUI", false), ("Y", false), ("YUI_config", false),
];

/// Environment profiles in the order they are applied.
const PROFILES: &[(Flags, &[(&str, bool)])] = &[
    (Flags::COUCH, COUCH),
    (Flags::RHINO, RHINO),
    (Flags::PROTOTYPEJS, PROTOTYPEJS),
    (Flags::NODE, NODE),
    (Flags::DEVEL, DEVEL),
    (Flags::DOJO, DOJO),
    (Flags::BROWSER, BROWSER),
    (Flags::NONSTANDARD, NONSTANDARD),
    (Flags::JQUERY, JQUERY),
    (Flags::MOOTOOLS, MOOTOOLS),
    (Flags::WORKER, WORKER),
    (Flags::WSH, WSH),
    (Flags::YUI, YUI),
];

/// Globals known to a run, with their writability.
#[derive(Debug, Clone, Default)]
pub struct Globals {
    names: IndexMap<String, bool>,
    blacklist: HashSet<String>,
}

impl Globals {
    /// The standard library globals
    pub fn standard() -> Self {
        let mut globals = Globals::default();
        globals.combine(STANDARD);
        globals
    }

    /// Add a set of names, skipping blacklisted ones
    pub fn combine(&mut self, set: &[(&str, bool)]) {
        for (name, writable) in set {
            if !self.blacklist.contains(*name) {
                self.names.insert((*name).to_string(), *writable);
            }
        }
    }

    /// Declare one name. A leading `-` removes the name instead and keeps
    /// later profiles from adding it back.
    pub fn declare(&mut self, name: &str, writable: bool) {
        match name.strip_prefix('-') {
            Some(removed) => {
                self.names.shift_remove(removed);
                self.blacklist.insert(removed.to_string());
            }
            None => {
                if !self.blacklist.contains(name) {
                    self.names.insert(name.to_string(), writable);
                }
            }
        }
    }

    /// Writability of a known global, `None` when unknown
    pub fn get(&self, name: &str) -> Option<bool> {
        self.names.get(name).copied()
    }

    /// Whether `name` is known
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Number of known globals
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no globals are known
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Apply environment profiles and the options they imply.
///
/// Runs at the start of every analysis and again after each option
/// directive, so a profile switched on mid-file takes effect from there.
pub fn assume(options: &mut Options, globals: &mut Globals) {
    for (flag, set) in PROFILES {
        if options.has(*flag) {
            globals.combine(set);
        }
    }
    if options.has(Flags::NODE) {
        options.set(Flags::GLOBALSTRICT, true);
    }
    if options.has(Flags::GLOBALSTRICT) && !options.is_disabled(Flags::STRICT) {
        options.set(Flags::STRICT, true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_globals() {
        let globals = Globals::standard();
        assert_eq!(globals.get("Math"), Some(false));
        assert!(globals.contains("JSON"));
        assert!(!globals.contains("window"));
    }

    #[test]
    fn test_browser_profile() {
        let mut options = Options::none();
        options.set(Flags::BROWSER, true);
        let mut globals = Globals::standard();
        assume(&mut options, &mut globals);
        assert_eq!(globals.get("window"), Some(false));
        assert_eq!(globals.get("onload"), Some(true));
        assert!(!options.has(Flags::STRICT));
    }

    #[test]
    fn test_node_profile_forces_strict() {
        let mut options = Options::none();
        options.set(Flags::NODE, true);
        let mut globals = Globals::standard();
        assume(&mut options, &mut globals);
        assert!(globals.contains("require"));
        assert_eq!(globals.get("exports"), Some(true));
        assert!(options.has(Flags::GLOBALSTRICT));
        assert!(options.has(Flags::STRICT));
    }

    #[test]
    fn test_explicitly_disabled_strict_survives_globalstrict() {
        let mut options = Options::none();
        options.set(Flags::STRICT, false);
        options.set(Flags::GLOBALSTRICT, true);
        let mut globals = Globals::standard();
        assume(&mut options, &mut globals);
        assert!(!options.has(Flags::STRICT));
    }

    #[test]
    fn test_blacklist_keeps_name_out() {
        let mut options = Options::none();
        options.set(Flags::JQUERY, true);
        let mut globals = Globals::standard();
        globals.declare("-$", false);
        assume(&mut options, &mut globals);
        assert!(!globals.contains("$"));
        assert!(globals.contains("jQuery"));
    }
}
