use serde::{Deserialize, Serialize};

/// 统一的 API 响应包装结构体（包含 errCode、errMsg、data）
/// data 字段可能为 null，因此使用 Option<T>
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(rename = "errCode")]
    pub err_code: i32,
    #[serde(rename = "errMsg")]
    pub err_msg: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            err_code: 0,
            err_msg: String::new(),
            data: Some(data),
        }
    }

    /// 成功但附带一条提示信息
    pub fn ok_with_notice(data: T, notice: impl Into<String>) -> Self {
        Self {
            err_code: 0,
            err_msg: notice.into(),
            data: Some(data),
        }
    }

    pub fn error(err_code: i32, err_msg: impl Into<String>) -> Self {
        Self {
            err_code,
            err_msg: err_msg.into(),
            data: None,
        }
    }
}

/// 分页结果（页码从 1 开始）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u32,
    pub num_pages: u32,
    pub total: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

/// 页码定位结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u32,
    pub num_pages: u32,
    pub offset: i64,
    pub limit: i64,
}

impl PageWindow {
    /// 根据请求的页码和总数计算实际页
    ///
    /// 页码缺失或无法解析时取第 1 页；超出 `1..=num_pages` 时取最后一页。
    /// 结果为空时也视为有 1 页。
    pub fn resolve(requested: Option<&str>, total: i64, page_size: u32) -> Self {
        let page_size = page_size.max(1);
        let num_pages = if total <= 0 {
            1
        } else {
            ((total - 1) / page_size as i64 + 1) as u32
        };

        let number = match requested.map(str::trim).map(str::parse::<i64>) {
            None | Some(Err(_)) => 1,
            Some(Ok(n)) if n >= 1 && n <= num_pages as i64 => n as u32,
            Some(Ok(_)) => num_pages,
        };

        Self {
            number,
            num_pages,
            offset: (number as i64 - 1) * page_size as i64,
            limit: page_size as i64,
        }
    }

    pub fn into_page<T>(self, items: Vec<T>, total: i64) -> Page<T> {
        Page {
            items,
            number: self.number,
            num_pages: self.num_pages,
            total,
            has_next: self.number < self.num_pages,
            has_previous: self.number > 1,
        }
    }
}
