use thiserror::Error;

use crate::models::{Difficulty, Section};

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 题目目录获取错误
    #[error("目录错误: {0}")]
    Catalog(#[from] CatalogError),
    /// 单题详情获取错误
    #[error("详情错误: {0}")]
    Fetch(#[from] FetchError),
    /// 组卷抽样错误
    #[error("组卷错误: {0}")]
    Sampling(#[from] SamplingError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 单题详情获取错误
///
/// 只在分发器内部出现，最终都会被折叠为"无详情"
#[derive(Debug, Error)]
pub enum FetchError {
    /// 非成功状态码
    #[error("HTTP 状态码 {status}")]
    Http { status: u16 },
    /// 网络传输失败
    #[error("网络请求失败: {source}")]
    Network { source: BoxedSource },
    /// 响应体无法解析
    #[error("响应解析失败: {source}")]
    Decode { source: BoxedSource },
}

/// 题目目录获取错误，对整个运行是致命的
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("[{section}] 目录请求失败: {source}")]
    RequestFailed { section: Section, source: BoxedSource },
    #[error("[{section}] 目录接口返回状态码 {status}")]
    BadStatus { section: Section, status: u16 },
    #[error("[{section}] 目录解析失败: {source}")]
    DecodeFailed { section: Section, source: BoxedSource },
}

/// 合并阶段被丢弃的记录
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("第 {position} 条目录记录缺少 questionId，已丢弃")]
    MissingIdentifier { position: usize },
}

/// 组卷抽样错误
#[derive(Debug, Error)]
pub enum SamplingError {
    /// 候选池无法满足配额
    #[error("{section} 模块 {module} 配额无法满足: {reason}")]
    UnsatisfiableQuota {
        section: Section,
        module: u8,
        reason: QuotaShortfall,
    },
    /// 多次随机尝试均失败
    #[error("{section} 模块 {module} 抽样 {attempts} 次仍未成功，最后一次: {last}")]
    BudgetExhausted {
        section: Section,
        module: u8,
        attempts: usize,
        last: QuotaShortfall,
    },
    /// 没有该模块的配额定义
    #[error("未定义 {section} 模块 {module} 的配额")]
    UnknownModule { section: Section, module: u8 },
    /// 抽到的题目在合并数据中不存在
    #[error("{section} 模块 {module} 的题目 {question_id} 不在题库数据中")]
    UnresolvedQuestion {
        section: Section,
        module: u8,
        question_id: String,
    },
}

/// 配额无法满足的具体原因
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuotaShortfall {
    /// 候选池可用题目总数不足
    #[error("候选池只有 {available} 道可用题目，需要 {required} 道")]
    PoolTooSmall { available: usize, required: usize },
    /// 难度上限之和小于目标题数
    #[error("难度上限之和 {capacity} 小于目标题数 {required}")]
    CeilingsTooLow { capacity: usize, required: usize },
    /// 知识点数量多于目标题数，无法全部覆盖
    #[error("共有 {skills} 个知识点，目标只有 {required} 道题")]
    TooManySkills { skills: usize, required: usize },
    /// 某个知识点在剩余难度名额内没有可选题目
    #[error("知识点 {skill} 在剩余难度名额内没有可选题目")]
    SkillUncoverable { skill: String },
    /// 难度名额仍有剩余，但对应难度的题目已经用尽
    #[error("已选 {chosen}/{required} 道后候选耗尽 (仍有名额的难度: {open:?})")]
    DifficultyExhausted {
        open: Vec<Difficulty>,
        chosen: usize,
        required: usize,
    },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed { path: String, source: BoxedSource },
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed { path: String, source: BoxedSource },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配额文件解析失败
    #[error("配额文件 {path} 解析失败: {source}")]
    QuotaParseFailed { path: String, source: BoxedSource },
    /// 配额文件中的键无法识别
    #[error("配额文件 {path} 中的键 '{key}' 无法识别")]
    UnknownQuotaKey { path: String, key: String },
}

// ========== 便捷构造函数 ==========

impl FetchError {
    pub fn network(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        FetchError::Network {
            source: Box::new(source),
        }
    }

    pub fn decode(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        FetchError::Decode {
            source: Box::new(source),
        }
    }
}

impl FileError {
    pub fn read_failed(path: impl Into<String>, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        }
    }

    pub fn write_failed(path: impl Into<String>, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
