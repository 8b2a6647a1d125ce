//! Node.js runtime mapping.
//!
//! Rewrites Ruby's process, file and directory APIs onto their Node.js
//! counterparts: `File.read` becomes `fs.readFileSync`, `system` becomes
//! `child_process.execSync`, `ARGV` is sliced out of `process.argv`, and so
//! on. The `fs` and `child_process` modules and `ARGV` are declared once at
//! the top of the program when something uses them.

use crate::builders::{call, call_args, global, list, option_hash, property, sequence, string, top_const};
use rbjs_emitter::{ConvertResult, Filter, FilterContext, Next, SetupToken};
use rbjs_tree::{Child, Node, NodeKind, s};
use tracing::trace;

pub const CHILD_PROCESS: SetupToken = SetupToken("child_process");
pub const FS: SetupToken = SetupToken("fs");
pub const ARGV: SetupToken = SetupToken("ARGV");

#[derive(Clone, Copy, Debug, Default)]
pub struct NodeFilter;

impl Filter for NodeFilter {
    fn name(&self) -> &'static str {
        "node"
    }

    fn rewrite(&self, node: &Node, cx: &mut FilterContext<'_>, next: Next) -> ConvertResult<Node> {
        let replacement = match node.kind() {
            NodeKind::Send => rewrite_send(node, cx),
            NodeKind::Block => rewrite_chdir_block(node),
            NodeKind::Const => rewrite_const(node, cx),
            NodeKind::Gvar => match node.sym_at(0) {
                Some("$stdin") => Some(stream("stdin")),
                Some("$stdout") => Some(stream("stdout")),
                Some("$stderr") => Some(stream("stderr")),
                _ => None,
            },
            NodeKind::Xstr => Some(rewrite_command(node, cx)),
            NodeKind::FileMacro => Some(global("__filename")),
            _ => None,
        };
        match replacement {
            Some(replacement) => {
                trace!(kind = %node.kind(), "node: rewritten");
                cx.process(&replacement)
            }
            None => next.run(node, cx),
        }
    }

    fn setup_tokens(&self) -> &'static [SetupToken] {
        &[CHILD_PROCESS, FS, ARGV]
    }

    fn setup_declaration(&self, token: SetupToken) -> Option<Node> {
        match token {
            CHILD_PROCESS => Some(require("child_process")),
            FS => Some(require("fs")),
            ARGV => Some(s!(
                Lvasgn,
                "ARGV",
                call(property(global("process"), "argv"), "slice", [s!(Int, 2)])
            )),
            _ => None,
        }
    }
}

/// `const name = require("name")`
fn require(module: &str) -> Node {
    let require = Node::new(
        NodeKind::Send,
        vec![Child::Nil, Child::sym("require"), Child::from(string(module))],
    );
    s!(Casgn, Child::Nil, module, require)
}

fn stream(name: &str) -> Node {
    property(global("process"), name)
}

fn fs(method: &str, args: Vec<Node>) -> Node {
    call(global("fs"), method, args)
}

fn process_call(method: &str, args: Vec<Node>) -> Node {
    call(global("process"), method, args)
}

fn owned(nodes: &[&Node]) -> Vec<Node> {
    nodes.iter().map(|&node| node.clone()).collect()
}

/// `(octal ...)` with the digits of an integer mode.
fn octal(mode: &Node) -> Node {
    Node::new(NodeKind::Octal, mode.children().to_vec())
}

fn rewrite_send(node: &Node, cx: &mut FilterContext<'_>) -> Option<Node> {
    let method = node.sym_at(1)?;
    let args = call_args(node)?;
    if node.is_nil_at(0) {
        return rewrite_kernel(method, &args, cx);
    }
    match top_const(node.node_at(0)?)? {
        target @ ("File" | "IO") => rewrite_file(target, method, &args, cx),
        "FileUtils" => rewrite_file_utils(method, &args, cx),
        "Dir" => rewrite_dir(method, &args, cx),
        _ => None,
    }
}

/// Receiverless calls: `exit`, `system`, `__dir__`, `require`.
fn rewrite_kernel(method: &str, args: &[&Node], cx: &mut FilterContext<'_>) -> Option<Node> {
    match (method, args) {
        ("__dir__", []) => Some(global("__dirname")),
        ("exit", [] | [_]) => Some(process_call("exit", owned(args))),
        ("system", [command]) => {
            cx.require_setup(CHILD_PROCESS);
            Some(call(
                global("child_process"),
                "execSync",
                [(*command).clone(), option_hash("stdio", "inherit")],
            ))
        }
        ("system", [command, rest @ ..]) => {
            cx.require_setup(CHILD_PROCESS);
            let rest = Node::new(NodeKind::Array, rest.iter().map(|&arg| Child::from(arg)).collect());
            Some(call(
                global("child_process"),
                "execFileSync",
                [(*command).clone(), rest, option_hash("stdio", "inherit")],
            ))
        }
        // Loaded implicitly by the mapping above.
        ("require", [library]) if matches!(library.str_at(0), Some("fileutils" | "tmpdir")) && library.is(&NodeKind::Str) => {
            Some(sequence([]))
        }
        _ => None,
    }
}

fn rewrite_file(target: &str, method: &str, args: &[&Node], cx: &mut FilterContext<'_>) -> Option<Node> {
    let replacement = match (method, args) {
        ("read", [path]) => fs("readFileSync", vec![(*path).clone(), string("utf8")]),
        ("write", [_, _]) => fs("writeFileSync", owned(args)),
        _ if target == "IO" => return None,
        ("exist?" | "exists?", [path]) => fs("existsSync", vec![(*path).clone()]),
        ("readlink", [path]) => fs("readlinkSync", vec![(*path).clone()]),
        ("realpath", [path]) => fs("realpathSync", vec![(*path).clone()]),
        ("rename", [_, _]) => fs("renameSync", owned(args)),
        ("chmod" | "lchmod", [mode, files @ ..]) if !files.is_empty() && mode.is(&NodeKind::Int) => {
            let name = format!("{method}Sync");
            sequence(files.iter().map(|&file| fs(&name, vec![file.clone(), octal(mode)])))
        }
        ("chown" | "lchown", [uid, gid, files @ ..])
            if !files.is_empty() && uid.is(&NodeKind::Int) && gid.is(&NodeKind::Int) =>
        {
            let name = format!("{method}Sync");
            sequence(
                files
                    .iter()
                    .map(|&file| fs(&name, vec![file.clone(), (*uid).clone(), (*gid).clone()])),
            )
        }
        ("ln" | "link", [_, _]) => fs("linkSync", owned(args)),
        ("symlink", [_, _]) => fs("symlinkSync", owned(args)),
        ("truncate", [_, _]) => fs("truncateSync", owned(args)),
        ("stat" | "lstat", [path]) => fs(&format!("{method}Sync"), vec![(*path).clone()]),
        ("unlink", [path]) => fs("unlinkSync", vec![(*path).clone()]),
        _ => return None,
    };
    cx.require_setup(FS);
    Some(replacement)
}

/// `FileUtils` calls. List arguments expand to one call per element.
fn rewrite_file_utils(method: &str, args: &[&Node], cx: &mut FilterContext<'_>) -> Option<Node> {
    let each = |name: &str, value: &Node, extra: &[&Node]| {
        sequence(list(value).into_iter().map(|item| {
            let mut call_args = vec![item.clone()];
            call_args.extend(owned(extra));
            fs(name, call_args)
        }))
    };
    let replacement = match (method, args) {
        ("cd", [_]) => return Some(process_call("chdir", owned(args))),
        ("pwd", []) => return Some(process_call("cwd", Vec::new())),
        ("cp" | "copy", [_, _]) => fs("copyFileSync", owned(args)),
        ("mv" | "move", [_, _]) => fs("renameSync", owned(args)),
        ("mkdir", [dirs]) => each("mkdirSync", dirs, &[]),
        ("rmdir", [dirs]) => each("rmdirSync", dirs, &[]),
        ("ln", [_, _]) => fs("linkSync", owned(args)),
        ("ln_s", [_, _]) => fs("symlinkSync", owned(args)),
        ("rm", [files]) => each("unlinkSync", files, &[]),
        ("chmod", [mode, files]) if mode.is(&NodeKind::Int) => {
            let mode = octal(mode);
            each("chmodSync", files, &[&mode])
        }
        ("chown", [uid, gid, files]) if uid.is(&NodeKind::Int) && gid.is(&NodeKind::Int) => {
            each("chownSync", files, &[*uid, *gid])
        }
        ("touch", [files, ..]) => sequence(
            list(files)
                .into_iter()
                .map(|file| fs("closeSync", vec![fs("openSync", vec![file.clone(), string("w")])])),
        ),
        _ => return None,
    };
    cx.require_setup(FS);
    Some(replacement)
}

fn rewrite_dir(method: &str, args: &[&Node], cx: &mut FilterContext<'_>) -> Option<Node> {
    let replacement = match (method, args) {
        ("chdir", [_]) => return Some(process_call("chdir", owned(args))),
        ("pwd", []) => return Some(process_call("cwd", Vec::new())),
        ("entries", _) => fs("readdirSync", owned(args)),
        ("mkdir", [dir]) => fs("mkdirSync", vec![(*dir).clone()]),
        ("rmdir", [dir]) => fs("rmdirSync", vec![(*dir).clone()]),
        ("mktmpdir", []) => fs("mkdtempSync", vec![string("d")]),
        ("mktmpdir", [prefix]) => {
            let prefix = if prefix.is(&NodeKind::Array) {
                prefix.node_at(0).cloned().unwrap_or_else(|| string("d"))
            } else {
                (*prefix).clone()
            };
            fs("mkdtempSync", vec![prefix])
        }
        _ => return None,
    };
    cx.require_setup(FS);
    Some(replacement)
}

/// `Dir.chdir(dir) { ... }` restores the working directory afterwards.
fn rewrite_chdir_block(node: &Node) -> Option<Node> {
    let chdir = node.node_at(0)?;
    if !chdir.is(&NodeKind::Send) || chdir.sym_at(1) != Some("chdir") || chdir.len() != 3 {
        return None;
    }
    if top_const(chdir.node_at(0)?) != Some("Dir") {
        return None;
    }
    let mut work = vec![chdir.clone()];
    work.extend(node.node_at(2).cloned());
    Some(sequence([
        s!(Gvasgn, "$oldwd", process_call("cwd", Vec::new())),
        s!(
            Kwbegin,
            s!(Ensure, sequence(work), process_call("chdir", vec![s!(Gvar, "$oldwd")]))
        ),
    ]))
}

fn rewrite_const(node: &Node, cx: &mut FilterContext<'_>) -> Option<Node> {
    match top_const(node)? {
        "ARGV" => {
            cx.require_setup(ARGV);
            None
        }
        "ENV" => Some(property(global("process"), "env")),
        "STDIN" => Some(stream("stdin")),
        "STDOUT" => Some(stream("stdout")),
        "STDERR" => Some(stream("stderr")),
        _ => None,
    }
}

/// Backtick commands run synchronously and return their output.
fn rewrite_command(node: &Node, cx: &mut FilterContext<'_>) -> Node {
    cx.require_setup(CHILD_PROCESS);
    let command = match node.children() {
        [Child::Node(only)] => only.clone(),
        parts => node.updated(NodeKind::Dstr, parts.to_vec()),
    };
    call(
        global("child_process"),
        "execSync",
        [command, option_hash("encoding", "utf8")],
    )
}

#[cfg(test)]
#[path = "../tests/node_filter_unit.rs"]
mod tests;
