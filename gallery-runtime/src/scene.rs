//! # Scene 模块
//!
//! 内存中的场景树，宿主把它映射到真实 UI。
//!
//! ## 核心概念
//!
//! - [`Anchor`]：元素的稳定标识，编排器通过锚点定位元素
//! - [`Element`]：父级、自然布局盒（相对父级）、可动画的内联样式、图片
//! - [`Scene`]：元素 arena，提供挂载、移除、重新挂载和几何捕获
//!
//! 元素的视口盒 = 祖先原点 + 自然布局 + `X`/`Y` 平移 + 自身以中心为原点的 `Scale`，
//! `Width`/`Height` 覆盖值替换自然尺寸。旋转和 3D 属性不影响捕获的盒。

use std::collections::HashMap;
use std::fmt;

use crate::animation::Animatable;
use crate::catalog::{PhotoId, SetId};
use crate::geometry::{BoxSnapshot, CaptureProps, Rect, Size, Vec2};

/// 父链最大深度，防止错误的父级关系造成死循环
const MAX_DEPTH: usize = 32;

/// 场景锚点
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Anchor {
    /// 全屏覆盖层，代理元素在其中飞行
    Overlay,
    /// 可复用的代理元素
    Proxy,
    /// 代理元素内的图片
    ProxyImage,

    /// 横向轨道
    Track,
    /// 轨道中的一项（包含预览按钮和文字）
    CarouselItem(SetId),
    /// 预览按钮（点击目标、锁定脉冲）
    PreviewButton(SetId),
    /// 预览框（视差倾斜、激活缩放、圆角和阴影）
    PreviewFrame(SetId),
    /// 预览框内的图片
    PreviewImage(SetId),
    /// 预览下方的标题文字
    PreviewMeta(SetId),
    /// 跟随光标的悬停标签
    HoverLabel,

    /// 详情视图
    DetailView,
    /// 详情网格
    Grid,
    /// 网格中的一张照片
    GridItem(PhotoId),

    /// 浮动岛容器
    Island,
    /// 首页模式的品牌标签
    IslandHomeLabel,
    /// 图集模式的关闭按钮
    IslandCloseButton,
    /// 图集模式的预览包裹层
    IslandPreviewWrapper,
    /// hero 槽位
    IslandHeroSlot,
    /// 槽位中的真实 hero 图片
    IslandHeroImage,
    /// 图集模式的标题
    IslandTitle,
}

impl Anchor {
    /// 是否是代理元素或其子元素
    pub fn is_proxy(&self) -> bool {
        matches!(self, Anchor::Proxy | Anchor::ProxyImage)
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anchor::Overlay => write!(f, "overlay"),
            Anchor::Proxy => write!(f, "proxy"),
            Anchor::ProxyImage => write!(f, "proxy-image"),
            Anchor::Track => write!(f, "track"),
            Anchor::CarouselItem(id) => write!(f, "carousel-item({id})"),
            Anchor::PreviewButton(id) => write!(f, "preview-button({id})"),
            Anchor::PreviewFrame(id) => write!(f, "preview-frame({id})"),
            Anchor::PreviewImage(id) => write!(f, "preview-image({id})"),
            Anchor::PreviewMeta(id) => write!(f, "preview-meta({id})"),
            Anchor::HoverLabel => write!(f, "hover-label"),
            Anchor::DetailView => write!(f, "detail-view"),
            Anchor::Grid => write!(f, "grid"),
            Anchor::GridItem(id) => write!(f, "grid-item({id})"),
            Anchor::Island => write!(f, "island"),
            Anchor::IslandHomeLabel => write!(f, "island-home-label"),
            Anchor::IslandCloseButton => write!(f, "island-close-button"),
            Anchor::IslandPreviewWrapper => write!(f, "island-preview-wrapper"),
            Anchor::IslandHeroSlot => write!(f, "island-hero-slot"),
            Anchor::IslandHeroImage => write!(f, "island-hero-image"),
            Anchor::IslandTitle => write!(f, "island-title"),
        }
    }
}

/// 可动画属性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Prop {
    /// 水平平移（px）
    X,
    /// 垂直平移（px）
    Y,
    /// 平面旋转（度）
    Rotation,
    /// 绕 X 轴旋转（度）
    RotationX,
    /// 绕 Y 轴旋转（度）
    RotationY,
    /// 纵深位移（px）
    Z,
    /// 以中心为原点的缩放
    Scale,
    /// 不透明度
    Opacity,
    /// 显式宽度
    Width,
    /// 显式高度
    Height,
    /// 圆角（px）
    BorderRadius,
    /// 阴影强度（0 表示无阴影）
    Shadow,
    /// 模糊半径（px）
    Blur,
}

impl Prop {
    /// 没有内联值时的默认值
    ///
    /// `Width`/`Height` 的默认值来自布局，不在这里给出。
    pub fn default_value(self) -> f32 {
        match self {
            Prop::Scale | Prop::Opacity => 1.0,
            _ => 0.0,
        }
    }
}

/// 父级
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parent {
    /// 直接挂在视口下
    Root,
    /// 挂在另一个元素下
    Element(Anchor),
    /// 已脱离场景（仍保留在 arena 中）
    Detached,
}

/// 图片引用
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImageRef {
    pub src: String,
    pub alt: String,
}

/// 场景元素
#[derive(Debug, Clone)]
pub struct Element {
    parent: Parent,
    layout: Rect,
    style: HashMap<Prop, f32>,
    image: Option<ImageRef>,
    text: Option<String>,
}

impl Element {
    fn new(parent: Parent, layout: Rect) -> Self {
        Self {
            parent,
            layout,
            style: HashMap::new(),
            image: None,
            text: None,
        }
    }

    pub fn parent(&self) -> &Parent {
        &self.parent
    }

    /// 相对父级的自然布局盒
    pub fn layout(&self) -> Rect {
        self.layout
    }

    pub fn image(&self) -> Option<&ImageRef> {
        self.image.as_ref()
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    fn prop(&self, prop: Prop) -> f32 {
        if let Some(value) = self.style.get(&prop) {
            return *value;
        }
        match prop {
            Prop::Width => self.layout.width,
            Prop::Height => self.layout.height,
            other => other.default_value(),
        }
    }
}

/// 场景
///
/// 以 [`Anchor`] 为键的元素 arena。
#[derive(Debug, Clone)]
pub struct Scene {
    elements: HashMap<Anchor, Element>,
    viewport: Size,
}

impl Scene {
    /// 创建空场景
    pub fn new(viewport: Size) -> Self {
        Self {
            elements: HashMap::new(),
            viewport,
        }
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    // ========== 结构 ==========

    /// 挂载元素
    ///
    /// 已存在的同名元素会被整体替换（样式清空）。
    pub fn mount(&mut self, anchor: Anchor, parent: Parent, layout: Rect) {
        self.elements.insert(anchor, Element::new(parent, layout));
    }

    /// 元素是否存在于 arena 中（不论是否挂载）
    pub fn contains(&self, anchor: &Anchor) -> bool {
        self.elements.contains_key(anchor)
    }

    pub fn get(&self, anchor: &Anchor) -> Option<&Element> {
        self.elements.get(anchor)
    }

    /// 元素数量
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// 移除元素及其全部后代
    ///
    /// 代理元素不会被销毁，只会脱离场景。
    pub fn remove_subtree(&mut self, root: &Anchor) {
        let doomed: Vec<Anchor> = self
            .elements
            .keys()
            .filter(|anchor| self.is_within(anchor, root))
            .cloned()
            .collect();

        for anchor in doomed {
            match anchor {
                Anchor::Proxy => self.detach(&anchor),
                Anchor::ProxyImage => {}
                _ => {
                    self.elements.remove(&anchor);
                }
            }
        }
    }

    /// 重新挂载到新的父级，并设置新的自然布局
    pub fn reparent(&mut self, anchor: &Anchor, parent: Parent, layout: Rect) -> bool {
        match self.elements.get_mut(anchor) {
            Some(element) => {
                element.parent = parent;
                element.layout = layout;
                true
            }
            None => false,
        }
    }

    /// 脱离场景（保留在 arena 中）
    pub fn detach(&mut self, anchor: &Anchor) {
        if let Some(element) = self.elements.get_mut(anchor) {
            element.parent = Parent::Detached;
        }
    }

    /// 元素是否经由父链连接到视口
    pub fn is_attached(&self, anchor: &Anchor) -> bool {
        let mut current = anchor;
        for _ in 0..MAX_DEPTH {
            match self.elements.get(current).map(|e| &e.parent) {
                Some(Parent::Root) => return true,
                Some(Parent::Element(parent)) => current = parent,
                Some(Parent::Detached) | None => return false,
            }
        }
        false
    }

    /// `anchor` 是否是 `root` 本身或其后代
    fn is_within(&self, anchor: &Anchor, root: &Anchor) -> bool {
        let mut current = anchor;
        for _ in 0..MAX_DEPTH {
            if current == root {
                return true;
            }
            match self.elements.get(current).map(|e| &e.parent) {
                Some(Parent::Element(parent)) => current = parent,
                _ => return false,
            }
        }
        false
    }

    // ========== 布局与样式 ==========

    pub fn layout(&self, anchor: &Anchor) -> Option<Rect> {
        self.elements.get(anchor).map(|e| e.layout)
    }

    pub fn set_layout(&mut self, anchor: &Anchor, layout: Rect) -> bool {
        match self.elements.get_mut(anchor) {
            Some(element) => {
                element.layout = layout;
                true
            }
            None => false,
        }
    }

    /// 读取属性的当前值（内联值或默认值）
    pub fn prop(&self, anchor: &Anchor, prop: Prop) -> Option<f32> {
        self.elements.get(anchor).map(|e| e.prop(prop))
    }

    /// 是否存在内联值
    pub fn has_inline(&self, anchor: &Anchor, prop: Prop) -> bool {
        self.elements
            .get(anchor)
            .is_some_and(|e| e.style.contains_key(&prop))
    }

    /// 写入内联值
    pub fn set_prop(&mut self, anchor: &Anchor, prop: Prop, value: f32) -> bool {
        match self.elements.get_mut(anchor) {
            Some(element) => {
                element.style.insert(prop, value);
                true
            }
            None => false,
        }
    }

    /// 清除指定的内联值，恢复默认
    pub fn clear_props(&mut self, anchor: &Anchor, props: &[Prop]) {
        if let Some(element) = self.elements.get_mut(anchor) {
            for prop in props {
                element.style.remove(prop);
            }
        }
    }

    /// 清除全部内联值
    pub fn clear_all_props(&mut self, anchor: &Anchor) {
        if let Some(element) = self.elements.get_mut(anchor) {
            element.style.clear();
        }
    }

    pub fn image(&self, anchor: &Anchor) -> Option<&ImageRef> {
        self.elements.get(anchor).and_then(|e| e.image.as_ref())
    }

    pub fn set_image(&mut self, anchor: &Anchor, image: ImageRef) -> bool {
        match self.elements.get_mut(anchor) {
            Some(element) => {
                element.image = Some(image);
                true
            }
            None => false,
        }
    }

    pub fn text(&self, anchor: &Anchor) -> Option<&str> {
        self.elements.get(anchor).and_then(|e| e.text.as_deref())
    }

    pub fn set_text(&mut self, anchor: &Anchor, text: impl Into<String>) -> bool {
        match self.elements.get_mut(anchor) {
            Some(element) => {
                element.text = Some(text.into());
                true
            }
            None => false,
        }
    }

    // ========== 几何捕获 ==========

    /// 元素当前的视口盒
    ///
    /// 元素不存在或未挂载到视口时返回 `None`。
    pub fn visual_rect(&self, anchor: &Anchor) -> Option<Rect> {
        self.visual_rect_at_depth(anchor, 0)
    }

    fn visual_rect_at_depth(&self, anchor: &Anchor, depth: usize) -> Option<Rect> {
        if depth >= MAX_DEPTH {
            return None;
        }
        let element = self.elements.get(anchor)?;
        let origin = match &element.parent {
            Parent::Root => Vec2::zero(),
            Parent::Element(parent) => {
                let parent_rect = self.visual_rect_at_depth(parent, depth + 1)?;
                Vec2::new(parent_rect.x, parent_rect.y)
            }
            Parent::Detached => return None,
        };

        let layout = element.layout;
        let rect = Rect::new(
            origin.x + layout.x + element.prop(Prop::X),
            origin.y + layout.y + element.prop(Prop::Y),
            element.prop(Prop::Width),
            element.prop(Prop::Height),
        );
        Some(rect.scale_about_center(element.prop(Prop::Scale)))
    }

    /// 捕获盒快照
    ///
    /// 输入：元素和需要额外读取的样式；输出：视口盒 + 请求的样式值。
    pub fn capture_box(&self, anchor: &Anchor, props: CaptureProps) -> Option<BoxSnapshot> {
        let rect = self.visual_rect(anchor)?;
        let element = self.elements.get(anchor)?;
        Some(BoxSnapshot {
            rect,
            border_radius: props
                .border_radius
                .then(|| element.prop(Prop::BorderRadius)),
            shadow: props.shadow.then(|| element.prop(Prop::Shadow)),
        })
    }

    /// 视口坐标下命中的预览（用于视差和悬停）
    pub fn hit_test<'a>(
        &self,
        point: Vec2,
        candidates: impl IntoIterator<Item = &'a Anchor>,
    ) -> Option<&'a Anchor> {
        candidates.into_iter().find(|anchor| {
            self.visual_rect(anchor)
                .is_some_and(|rect| rect.contains(point))
        })
    }
}

impl Animatable for Scene {
    fn get_property(&self, anchor: &Anchor, prop: Prop) -> Option<f32> {
        self.prop(anchor, prop)
    }

    fn set_property(&mut self, anchor: &Anchor, prop: Prop, value: f32) -> bool {
        self.set_prop(anchor, prop, value)
    }
}
