//! XML 文档树
//!
//! 服务端返回的配置文档需要"局部修改、整体回写"：只改调用方指定的字段，
//! 其余节点必须原样保留。因此这里不做基于 schema 的反序列化，而是把文档
//! 解析为一棵有序、带属性的可变树：
//!
//! - 未修改的元素复用解析时捕获的原始起始标签文本
//! - 文本节点保存转义后的原始内容
//! - 注释、CDATA、处理指令、空白全部保留
//!
//! 这样序列化后，未触碰的区域与原文逐字节一致。
//!
//! 元素名匹配一律按本地名（忽略命名空间前缀）。

use std::fmt::Write as _;

use quick_xml::escape::{escape, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Result, TransportError};

/// 默认 XML 声明内容
const DEFAULT_DECLARATION: &str = r#"xml version="1.0" encoding="UTF-8""#;

/// 文档节点
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// 子元素
    Element(Element),
    /// 文本（转义后的原始内容）
    Text(String),
    /// CDATA 段
    CData(String),
    /// 注释
    Comment(String),
    /// XML 声明 `<?xml ...?>`
    Declaration(String),
    /// 处理指令
    ProcessingInstruction(String),
    /// DOCTYPE
    DocType(String),
}

impl Node {
    /// 转为元素引用
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    fn write_to(&self, out: &mut String) {
        match self {
            Node::Element(el) => el.write_to(out),
            Node::Text(raw) => out.push_str(raw),
            Node::CData(raw) => {
                let _ = write!(out, "<![CDATA[{}]]>", raw);
            }
            Node::Comment(raw) => {
                let _ = write!(out, "<!--{}-->", raw);
            }
            Node::Declaration(raw) | Node::ProcessingInstruction(raw) => {
                let _ = write!(out, "<?{}?>", raw);
            }
            Node::DocType(raw) => {
                let _ = write!(out, "<!DOCTYPE {}>", raw);
            }
        }
    }
}

/// XML 元素
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// 限定名（可能带前缀，如 `ovf:Info`）
    name: String,

    /// 属性列表，保持原始顺序；值为反转义后的文本
    attributes: Vec<(String, String)>,

    /// 子节点
    children: Vec<Node>,

    /// 是否为自闭合标签
    self_closing: bool,

    /// 解析时捕获的起始标签原文（不含 `<`、`>`），属性修改后失效
    raw_start: Option<String>,
}

impl Element {
    /// 创建新元素
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            self_closing: true,
            raw_start: None,
        }
    }

    /// 添加属性（构建器风格）
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    /// 设置文本内容（构建器风格）
    pub fn with_text(mut self, text: &str) -> Self {
        self.set_text(text);
        self
    }

    /// 追加子元素（构建器风格）
    pub fn with_child(mut self, child: Element) -> Self {
        self.push_child(child);
        self
    }

    /// 限定名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 本地名（去掉命名空间前缀）
    pub fn local_name(&self) -> &str {
        match self.name.rsplit_once(':') {
            Some((_, local)) => local,
            None => &self.name,
        }
    }

    /// 全部属性
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// 读取属性值
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// 设置属性：已存在则原位覆盖，否则追加到末尾
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
        self.raw_start = None;
    }

    /// 直接子节点
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// 直接子元素
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// 直接子元素（可变）
    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            _ => None,
        })
    }

    /// 第一个指定名称的直接子元素
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|el| el.local_name() == name)
    }

    /// 第一个指定名称的直接子元素（可变）
    pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.elements_mut().find(|el| el.local_name() == name)
    }

    /// 所有指定名称的直接子元素
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements().filter(move |el| el.local_name() == name)
    }

    /// 按节点下标取元素（可变）
    pub fn element_at_mut(&mut self, index: usize) -> Option<&mut Element> {
        match self.children.get_mut(index) {
            Some(Node::Element(el)) => Some(el),
            _ => None,
        }
    }

    /// 沿直接子元素路径向下查找，每一级取第一个匹配
    pub fn find_path(&self, path: &[&str]) -> Option<&Element> {
        path.iter().try_fold(self, |current, name| current.child(name))
    }

    /// 第一个指定名称的后代元素（前序深度优先，文档顺序）
    pub fn find(&self, name: &str) -> Option<&Element> {
        for el in self.elements() {
            if el.local_name() == name {
                return Some(el);
            }
            if let Some(found) = el.find(name) {
                return Some(found);
            }
        }
        None
    }

    /// 第一个指定名称的后代元素（可变）
    pub fn find_mut(&mut self, name: &str) -> Option<&mut Element> {
        for el in self.elements_mut() {
            if el.local_name() == name {
                return Some(el);
            }
            if let Some(found) = el.find_mut(name) {
                return Some(found);
            }
        }
        None
    }

    /// 所有指定名称的后代元素，按文档顺序
    pub fn find_all<'a>(&'a self, name: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        self.collect_named(name, &mut found);
        found
    }

    fn collect_named<'a>(&'a self, name: &str, found: &mut Vec<&'a Element>) {
        for el in self.elements() {
            if el.local_name() == name {
                found.push(el);
            }
            el.collect_named(name, found);
        }
    }

    /// 找到拥有指定名称直接子元素的元素（自身或后代，文档顺序）
    pub fn find_parent_of_mut(&mut self, child_name: &str) -> Option<&mut Element> {
        if self.child(child_name).is_some() {
            return Some(self);
        }
        for el in self.elements_mut() {
            if let Some(found) = el.find_parent_of_mut(child_name) {
                return Some(found);
            }
        }
        None
    }

    /// 指定名称的第一个直接子元素在子节点列表中的下标
    pub fn position_of_child(&self, name: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|node| matches!(node, Node::Element(el) if el.local_name() == name))
    }

    /// 在指定下标插入子元素
    pub fn insert_child_at(&mut self, index: usize, child: Element) {
        let index = index.min(self.children.len());
        self.children.insert(index, Node::Element(child));
    }

    /// 追加子元素
    pub fn push_child(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// 直接文本内容（反转义，拼接所有文本与 CDATA 子节点）
    pub fn text(&self) -> String {
        let mut text = String::new();
        for node in &self.children {
            match node {
                Node::Text(raw) => match unescape(raw) {
                    Ok(value) => text.push_str(&value),
                    Err(_) => text.push_str(raw),
                },
                Node::CData(raw) => text.push_str(raw),
                _ => {}
            }
        }
        text
    }

    /// 用单个文本节点替换全部子节点
    pub fn set_text(&mut self, text: &str) {
        self.children.clear();
        if !text.is_empty() {
            self.children.push(Node::Text(escape(text).into_owned()));
        }
    }

    fn from_start(start: &BytesStart<'_>, self_closing: bool) -> Result<Self> {
        let name = utf8(start.name().as_ref())?.to_string();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = utf8(attr.key.as_ref())?.to_string();
            let value = attr.unescape_value()?.into_owned();
            attributes.push((key, value));
        }

        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
            self_closing,
            raw_start: Some(utf8(start)?.to_string()),
        })
    }

    fn write_to(&self, out: &mut String) {
        out.push('<');
        match &self.raw_start {
            Some(raw) => out.push_str(raw),
            None => {
                out.push_str(&self.name);
                for (key, value) in &self.attributes {
                    let _ = write!(out, " {}=\"{}\"", key, escape(value));
                }
            }
        }

        if self.self_closing && self.children.is_empty() {
            out.push_str("/>");
            return;
        }

        out.push('>');
        for child in &self.children {
            child.write_to(out);
        }
        let _ = write!(out, "</{}>", self.name);
    }
}

/// XML 文档
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    /// 根元素之前的节点（声明、注释、空白）
    prolog: Vec<Node>,

    /// 根元素
    root: Element,

    /// 根元素之后的节点
    epilog: Vec<Node>,
}

impl XmlDocument {
    /// 以标准 UTF-8 声明创建新文档
    pub fn new(root: Element) -> Self {
        Self {
            prolog: vec![
                Node::Declaration(DEFAULT_DECLARATION.to_string()),
                Node::Text("\n".to_string()),
            ],
            root,
            epilog: Vec::new(),
        }
    }

    /// 解析 XML 文本
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(false);

        let mut prolog = Vec::new();
        let mut epilog = Vec::new();
        let mut root: Option<Element> = None;
        let mut stack: Vec<Element> = Vec::new();

        loop {
            let node = match reader.read_event()? {
                Event::Start(start) => {
                    stack.push(Element::from_start(&start, false)?);
                    continue;
                }
                Event::End(_) => {
                    let el = stack
                        .pop()
                        .ok_or_else(|| TransportError::Parse("出现多余的结束标签".to_string()))?;
                    Node::Element(el)
                }
                Event::Empty(start) => Node::Element(Element::from_start(&start, true)?),
                Event::Text(text) => Node::Text(utf8(&text)?.to_string()),
                Event::CData(data) => Node::CData(utf8(&data)?.to_string()),
                Event::Comment(comment) => Node::Comment(utf8(&comment)?.to_string()),
                Event::Decl(decl) => Node::Declaration(utf8(&decl)?.to_string()),
                Event::PI(pi) => Node::ProcessingInstruction(utf8(&pi)?.to_string()),
                Event::DocType(doctype) => Node::DocType(utf8(&doctype)?.to_string()),
                Event::Eof => break,
            };

            if let Some(parent) = stack.last_mut() {
                parent.children.push(node);
                continue;
            }

            match node {
                Node::Element(el) => {
                    if root.is_some() {
                        return Err(TransportError::Parse("文档存在多个根元素".to_string()));
                    }
                    root = Some(el);
                }
                other if root.is_none() => prolog.push(other),
                other => epilog.push(other),
            }
        }

        if let Some(open) = stack.last() {
            return Err(TransportError::Parse(format!("元素 <{}> 未闭合", open.name)));
        }
        let root = root.ok_or_else(|| TransportError::Parse("文档缺少根元素".to_string()))?;

        Ok(Self { prolog, root, epilog })
    }

    /// 根元素
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// 根元素（可变）
    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    /// 序列化为 XML 文本
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        for node in &self.prolog {
            node.write_to(&mut out);
        }
        self.root.write_to(&mut out);
        for node in &self.epilog {
            node.write_to(&mut out);
        }
        out
    }
}

fn utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|e| TransportError::Parse(format!("非 UTF-8 内容: {}", e)))
}
