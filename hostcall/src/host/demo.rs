//! Built-in classes for the in-process host
//!
//! `lang.Object` and `lang.String` stand in for the host's core library;
//! `example.Util` and `example.Point` are small user classes exercising
//! statics, overloads, constructors, instance state and exceptions.

use super::{
    ClassBuilder, ClassPath, ClassRef, HostException, HostObject, Native, OBJECT_CLASS,
    STRING_CLASS, exception_types,
};
use crate::value::Value;

pub const UTIL_CLASS: &str = "example.Util";
pub const POINT_CLASS: &str = "example.Point";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

fn int_arg(args: &[Native], index: usize) -> Result<i32, HostException> {
    args.get(index)
        .and_then(Native::as_i64)
        .and_then(|n| i32::try_from(n).ok())
        .ok_or_else(|| HostException::illegal_argument("argument type mismatch"))
}

fn long_arg(args: &[Native], index: usize) -> Result<i64, HostException> {
    args.get(index)
        .and_then(Native::as_i64)
        .ok_or_else(|| HostException::illegal_argument("argument type mismatch"))
}

fn str_arg(args: &[Native], index: usize) -> Result<&str, HostException> {
    match args.get(index) {
        Some(Native::Str(s)) => Ok(s.as_ref()),
        Some(n) if n.is_null() => Err(HostException::null_pointer()),
        _ => Err(HostException::illegal_argument("argument type mismatch")),
    }
}

fn this_str(this: &Native) -> Result<&str, HostException> {
    this.as_str()
        .ok_or_else(|| HostException::illegal_argument("object is not an instance of declaring class"))
}

fn this_point(this: &Native) -> Result<Point, HostException> {
    this.as_object()
        .and_then(|o| o.state::<Point>())
        .copied()
        .ok_or_else(|| HostException::illegal_argument("object is not an instance of declaring class"))
}

fn new_point(x: i32, y: i32) -> Native {
    Native::Object(HostObject::new(POINT_CLASS, Point { x, y }))
}

fn number_format(input: &str) -> HostException {
    HostException::new(
        exception_types::NUMBER_FORMAT,
        format!("For input string: \"{input}\""),
    )
}

pub fn object_class() -> ClassRef {
    ClassBuilder::new(OBJECT_CLASS)
        .constructor(&[], |_| Ok(Native::Object(HostObject::new(OBJECT_CLASS, ()))))
        .build()
}

pub fn string_class() -> ClassRef {
    ClassBuilder::new(STRING_CLASS)
        .constructor(&[STRING_CLASS], |args| Ok(Native::Str(str_arg(args, 0)?.into())))
        .method("length", &[], |this, _| {
            Ok(Native::Int(this_str(this)?.chars().count() as i32))
        })
        .method("isEmpty", &[], |this, _| Ok(Native::Boolean(this_str(this)?.is_empty())))
        .method("toUpperCase", &[], |this, _| {
            Ok(Native::Str(this_str(this)?.to_uppercase().into()))
        })
        .method("concat", &[STRING_CLASS], |this, args| {
            let joined = format!("{}{}", this_str(this)?, str_arg(args, 0)?);
            Ok(Native::Str(joined.into()))
        })
        .method("charAt", &["int"], |this, args| {
            let s = this_str(this)?;
            let index = int_arg(args, 0)?;
            let len = s.chars().count();
            usize::try_from(index)
                .ok()
                .and_then(|i| s.chars().nth(i))
                .map(Native::Char)
                .ok_or_else(|| {
                    HostException::new(
                        "lang.StringIndexOutOfBoundsException",
                        format!("index {index} out of bounds for length {len}"),
                    )
                })
        })
        .static_method("valueOf", &["long"], |args| {
            Ok(Native::Str(long_arg(args, 0)?.to_string().into()))
        })
        .build()
}

pub fn util_class() -> ClassRef {
    ClassBuilder::new(UTIL_CLASS)
        .static_method("parseNumber", &[STRING_CLASS], |args| {
            let input = str_arg(args, 0)?;
            input
                .trim()
                .parse::<i32>()
                .map(Native::Int)
                .map_err(|_| number_format(input))
        })
        .static_method("parseNumber", &[STRING_CLASS, "int"], |args| {
            let input = str_arg(args, 0)?;
            let radix = int_arg(args, 1)?;
            let radix = u32::try_from(radix)
                .ok()
                .filter(|r| (2..=36).contains(r))
                .ok_or_else(|| number_format(input))?;
            i32::from_str_radix(input.trim(), radix)
                .map(Native::Int)
                .map_err(|_| number_format(input))
        })
        .static_method("max", &["long", "long"], |args| {
            Ok(Native::Long(long_arg(args, 0)?.max(long_arg(args, 1)?)))
        })
        .static_method("isPositive", &["long"], |args| {
            Ok(Native::Boolean(long_arg(args, 0)? > 0))
        })
        .static_method("greeting", &[], |_| Ok(Native::Str("hello".into())))
        .static_method("nothing", &[], |_| Ok(Native::Null))
        .static_method("square", &["double"], |args| {
            let x = args.first().and_then(Native::as_f64).unwrap_or_default();
            Ok(Native::Double(x * x))
        })
        .static_method("initial", &[STRING_CLASS], |args| {
            let s = str_arg(args, 0)?;
            s.chars().next().map(Native::Char).ok_or_else(|| {
                HostException::new(
                    "lang.StringIndexOutOfBoundsException",
                    "index 0 out of bounds for length 0",
                )
            })
        })
        .static_method("describe", &[OBJECT_CLASS], |args| {
            let text = match args.first() {
                Some(Native::Str(s)) => format!("string {s}"),
                Some(Native::Char(c)) => format!("char {c}"),
                Some(Native::Object(o)) => format!("object {}", o.class_name()),
                Some(Native::Ref(r)) => format!("reference {}", r.kind_name()),
                Some(Native::Interp(Value::Nil)) | Some(Native::Null) | None => "null".to_string(),
                Some(Native::Interp(v)) => format!("interpreter {}", v.type_name()),
                Some(other) => format!("value {other}"),
            };
            Ok(Native::Str(text.into()))
        })
        .static_method("fail", &[STRING_CLASS], |args| {
            Err(HostException::new(exception_types::RUNTIME, str_arg(args, 0)?))
        })
        .static_method("silent", &[], |_| {
            Err(HostException::without_message(exception_types::RUNTIME))
        })
        .private_method("secret", &[], |_, _| Ok(Native::Str("hidden".into())))
        .build()
}

pub fn point_class() -> ClassRef {
    ClassBuilder::new(POINT_CLASS)
        .constructor(&["int", "int"], |args| Ok(new_point(int_arg(args, 0)?, int_arg(args, 1)?)))
        .constructor(&[], |_| Ok(new_point(0, 0)))
        .method("getX", &[], |this, _| Ok(Native::Int(this_point(this)?.x)))
        .method("getY", &[], |this, _| Ok(Native::Int(this_point(this)?.y)))
        .method("translate", &["int", "int"], |this, args| {
            let p = this_point(this)?;
            let x = p.x.checked_add(int_arg(args, 0)?);
            let y = p.y.checked_add(int_arg(args, 1)?);
            match (x, y) {
                (Some(x), Some(y)) => Ok(new_point(x, y)),
                _ => Err(HostException::new(exception_types::ARITHMETIC, "integer overflow")),
            }
        })
        .method("distanceSquared", &[POINT_CLASS], |this, args| {
            let a = this_point(this)?;
            let b = match args.first() {
                Some(n) if n.is_null() => return Err(HostException::null_pointer()),
                Some(n) => this_point(n)?,
                None => return Err(HostException::illegal_argument("wrong number of arguments")),
            };
            let dx = i64::from(a.x) - i64::from(b.x);
            let dy = i64::from(a.y) - i64::from(b.y);
            Ok(Native::Long(dx * dx + dy * dy))
        })
        .method("equals", &[OBJECT_CLASS], |this, args| {
            let a = this_point(this)?;
            let same = args
                .first()
                .and_then(Native::as_object)
                .and_then(|o| o.state::<Point>())
                .is_some_and(|b| *b == a);
            Ok(Native::Boolean(same))
        })
        .method("toString", &[], |this, _| {
            let p = this_point(this)?;
            Ok(Native::Str(format!("Point({}, {})", p.x, p.y).into()))
        })
        .static_method("origin", &[], |_| Ok(new_point(0, 0)))
        .build()
}

/// Class path with the core and example classes
pub fn demo_class_path() -> ClassPath {
    ClassPath::new()
        .with(object_class())
        .with(string_class())
        .with(util_class())
        .with(point_class())
}
